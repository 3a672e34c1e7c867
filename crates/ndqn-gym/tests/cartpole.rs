use anyhow::Result;
use ndqn_core::env::Env;
use ndqn_gym::GymEnv;

#[test]
#[ignore = "needs a python interpreter with gymnasium installed"]
fn gym_cartpole_round_trip() -> Result<()> {
    let mut env = GymEnv::new("CartPole-v1", None)?;
    let description = env.env_description();
    assert_eq!(description.n_actions()?, 2);
    assert_eq!(description.observation_size(), 4);
    let state = env.reset(0)?;
    assert_eq!(state.len(), 4);
    let snapshot = env.step(1)?;
    assert_eq!(snapshot.reward, 1.0);
    assert!(env.step(5).is_err());
    env.close()?;
    Ok(())
}

#[test]
#[ignore = "needs a python interpreter with gymnasium installed"]
fn continuous_action_spaces_are_rejected() {
    assert!(GymEnv::new("Pendulum-v1", None).is_err());
}
