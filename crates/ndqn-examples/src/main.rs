use anyhow::Result;
use clap::{Parser, ValueEnum};
use ndqn_agents::dqn::DqnParams;
use ndqn_api::{
    builders::{dqn::DqnBuilder, trainer::TrainerBuilder},
    logging::init_tracing,
};
use ndqn_candle_lm::device::DeviceKind;
use ndqn_core::{
    Algorithm,
    env::{Env, cartpole::CartPole},
};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EnvKind {
    /// built-in cart-pole simulation
    Native,
    /// gymnasium through the embedded python interpreter
    Gym,
}

/// Trains a one hidden layer Q-network online (no replay buffer, no target network) on cart-pole.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[arg(long, default_value_t = 10000)]
    episodes: usize,

    #[arg(long, default_value_t = 1e-4)]
    lr: f64,

    #[arg(long, default_value_t = 0.99)]
    gamma: f64,

    #[arg(long, default_value_t = 1e-5)]
    eps_dec: f64,

    #[arg(long, default_value_t = 0.01)]
    eps_min: f64,

    /// Gradient norm clipping, off when not given
    #[arg(long)]
    max_grad_norm: Option<f32>,

    /// Seeds both the environment resets and the agent's exploration
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 100)]
    log_every: usize,

    #[arg(long, default_value_t = DeviceKind::Auto)]
    device: DeviceKind,

    #[arg(long, value_enum, default_value_t = EnvKind::Native)]
    env: EnvKind,

    #[arg(long, default_value = "CartPole-v1")]
    gym_id: String,

    #[arg(long, default_value = "cartpole_naive_dqn.png")]
    plot: PathBuf,

    #[arg(long)]
    no_plot: bool,
}

#[cfg(feature = "gym")]
fn gym_env(id: &str) -> Result<Box<dyn Env>> {
    Ok(Box::new(ndqn_gym::GymEnv::new(id, None)?))
}

#[cfg(not(feature = "gym"))]
fn gym_env(_id: &str) -> Result<Box<dyn Env>> {
    anyhow::bail!("built without the `gym` feature, rebuild with `--features gym`")
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let env: Box<dyn Env> = match args.env {
        EnvKind::Native => Box::new(CartPole::default()),
        EnvKind::Gym => gym_env(&args.gym_id)?,
    };

    let dqn_builder = DqnBuilder {
        learning_rate: args.lr,
        max_grad_norm: args.max_grad_norm,
        device: args.device,
        params: DqnParams {
            gamma: args.gamma,
            eps_dec: args.eps_dec,
            eps_min: args.eps_min,
            ..DqnParams::default()
        },
        seed: args.seed,
    };
    let agent = dqn_builder.build(&env.env_description())?;

    let trainer_builder = TrainerBuilder {
        n_games: args.episodes,
        log_every: args.log_every,
        seed: args.seed,
        plot_path: (!args.no_plot).then_some(args.plot),
        ..TrainerBuilder::default()
    };
    let mut trainer = trainer_builder.build(env, agent)?;
    info!(episodes = trainer.n_games, seed = trainer.seed, "starting training");
    let report = trainer.train()?;
    info!(
        best_score = report.scores.iter().cloned().fold(0f32, f32::max),
        "done"
    );
    Ok(())
}
