use crate::utils::stats::running_average;
use anyhow::{Result, anyhow, ensure};
use plotters::prelude::*;
use std::{fmt::Display, ops::Range, path::Path};

fn plot_err<E: Display>(e: E) -> anyhow::Error {
    anyhow!("failed to draw learning curve: {e}")
}

/// Vertical extent of the score axis: covers every score and average with 5% padding on both
/// ends, whatever their sign.
pub fn score_axis_range(scores: &[f32], averages: &[f32]) -> Range<f32> {
    let (lo, hi) = scores
        .iter()
        .chain(averages.iter())
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    if lo > hi {
        return 0f32..1f32;
    }
    let pad = ((hi - lo) * 0.05).max(0.5);
    (lo - pad)..(hi + pad)
}

/// Renders the learning curve: per-episode score and its running average over `average_window`
/// episodes on the left axis, epsilon on the right one. `x` holds the (1-based) episode numbers.
pub fn plot_learning_curve(
    path: &Path,
    x: &[usize],
    scores: &[f32],
    epsilons: &[f64],
    average_window: usize,
) -> Result<()> {
    ensure!(!x.is_empty(), "nothing to plot");
    ensure!(
        x.len() == scores.len() && x.len() == epsilons.len(),
        "episode, score and epsilon series differ in length ({}, {}, {})",
        x.len(),
        scores.len(),
        epsilons.len()
    );
    ensure!(average_window > 0, "average window must be positive");
    let running = running_average(scores, average_window);
    let x_min = x[0] as f64;
    let x_max = (x[x.len() - 1] as f64).max(x_min + 1.);
    let y_range = score_axis_range(scores, &running);

    let root = BitMapBackend::new(path, (1024, 640)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .caption("Learning curve", ("sans-serif", 24))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Right, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_min..x_max, y_range)
        .map_err(plot_err)?
        .set_secondary_coord(x_min..x_max, 0f64..1f64);

    chart
        .configure_mesh()
        .x_desc("Episode")
        .y_desc("Score")
        .draw()
        .map_err(plot_err)?;
    chart
        .configure_secondary_axes()
        .y_desc("Epsilon")
        .draw()
        .map_err(plot_err)?;

    let episodes = || x.iter().map(|e| *e as f64);
    chart
        .draw_series(LineSeries::new(
            episodes().zip(scores.iter().cloned()),
            BLUE.mix(0.25),
        ))
        .map_err(plot_err)?
        .label("score")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.mix(0.25)));
    chart
        .draw_series(LineSeries::new(episodes().zip(running), &BLUE))
        .map_err(plot_err)?
        .label(format!("score, average of previous {average_window}"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    chart
        .draw_secondary_series(LineSeries::new(
            episodes().zip(epsilons.iter().cloned()),
            &RED,
        ))
        .map_err(plot_err)?
        .label("epsilon")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;
    root.present().map_err(plot_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{plot_learning_curve, score_axis_range};
    use crate::utils::stats::running_average;
    use std::path::Path;

    #[test]
    fn mismatched_series_are_rejected() {
        let path = Path::new("never_written.png");
        assert!(plot_learning_curve(path, &[1, 2], &[1.0], &[1.0, 0.9], 100).is_err());
        assert!(plot_learning_curve(path, &[], &[], &[], 100).is_err());
        assert!(plot_learning_curve(path, &[1], &[1.0], &[1.0], 0).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn score_axis_covers_negative_returns() {
        let scores: Vec<f32> = (0..200).map(|e| -79.0 + (e % 30) as f32).collect();
        let averages = running_average(&scores, 100);
        let range = score_axis_range(&scores, &averages);
        assert!(range.start < -79.0 && range.start > -90.0, "{range:?}");
        assert!(range.end > -50.0 && range.end < -40.0, "{range:?}");
    }

    #[test]
    fn score_axis_is_padded_and_never_empty() {
        let range = score_axis_range(&[10.0, 500.0], &[10.0, 255.0]);
        assert!(range.start < 10.0 && range.end > 500.0);
        let flat = score_axis_range(&[-3.0; 4], &[-3.0; 4]);
        assert!(flat.start < -3.0 && flat.end > -3.0);
        assert_eq!(score_axis_range(&[], &[]), 0.0..1.0);
    }

    #[test]
    #[ignore = "text rendering needs system fonts"]
    fn writes_a_png() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("curve.png");
        let x: Vec<usize> = (1..=50).collect();
        let scores: Vec<f32> = x.iter().map(|e| (*e % 17) as f32 * 3.).collect();
        let epsilons: Vec<f64> = x.iter().map(|e| 1.0 - *e as f64 / 60.).collect();
        plot_learning_curve(&path, &x, &scores, &epsilons, 10)?;
        // negative returns, as in acrobot or mountain car
        let negative: Vec<f32> = scores.iter().map(|s| -s - 50.).collect();
        plot_learning_curve(&path, &x, &negative, &epsilons, 10)?;
        assert!(std::fs::metadata(&path)?.len() > 0);
        Ok(())
    }
}
