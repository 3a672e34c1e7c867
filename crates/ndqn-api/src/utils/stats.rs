/// Mean of the last `window` values (fewer if not enough are available). Zero for empty input.
pub fn moving_average(values: &[f32], window: usize) -> f32 {
    if values.is_empty() || window == 0 {
        return 0.;
    }
    let tail = &values[values.len().saturating_sub(window)..];
    tail.iter().sum::<f32>() / tail.len() as f32
}

/// `moving_average` evaluated at every prefix, the smoothed curve of a learning plot.
pub fn running_average(values: &[f32], window: usize) -> Vec<f32> {
    (1..=values.len())
        .map(|end| moving_average(&values[..end], window))
        .collect()
}
