use anyhow::Result;
use ndqn_core::{
    env::{Env, EnvironmentDescription, SnapShot, Space, cartpole::CartPole},
    error::NdqnError,
    tensor::ObsBuffer,
};

/// Counts up by one each step and truncates after four steps.
struct CountingEnv {
    t: u64,
}

impl Env for CountingEnv {
    fn reset(&mut self, seed: u64) -> Result<ObsBuffer> {
        self.t = seed;
        Ok(ObsBuffer::from_vec(vec![self.t as f32]))
    }

    fn step(&mut self, action: usize) -> Result<SnapShot> {
        self.t += 1 + action as u64;
        Ok(SnapShot {
            state: ObsBuffer::from_vec(vec![self.t as f32]),
            reward: action as f32,
            terminated: false,
            truncated: self.t >= 4,
        })
    }

    fn env_description(&self) -> EnvironmentDescription {
        EnvironmentDescription::new(Space::continuous_from_dims(vec![1]), Space::Discrete(2))
    }
}

#[test]
fn boxed_envs_forward_calls() -> Result<()> {
    let mut env: Box<dyn Env> = Box::new(CountingEnv { t: 0 });
    assert_eq!(env.reset(1)?.data, vec![1.]);
    let snapshot = env.step(1)?;
    assert_eq!(snapshot.state.data, vec![3.]);
    assert_eq!(snapshot.reward, 1.);
    assert!(!snapshot.done());
    assert!(env.step(0)?.done());
    assert_eq!(env.env_description().n_actions()?, 2);
    Ok(())
}

#[test]
fn continuous_actions_cannot_be_enumerated() {
    let description = EnvironmentDescription::new(
        Space::continuous_from_dims(vec![3]),
        Space::continuous_from_dims(vec![1]),
    );
    let err = description.n_actions().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<NdqnError>(),
        Some(NdqnError::UnsupportedSpace(_))
    ));
}

#[test]
fn cartpole_description() {
    let description = CartPole::default().env_description();
    assert_eq!(description.observation_size(), 4);
    assert_eq!(description.n_actions().ok(), Some(2));
}

#[test]
fn cartpole_episodes_are_reproducible() -> Result<()> {
    let run = |seed: u64| -> Result<Vec<Vec<f32>>> {
        let mut env = CartPole::default();
        let mut states = vec![env.reset(seed)?.to_data()];
        for step in 0..20usize {
            let snapshot = env.step(step % 2)?;
            let done = snapshot.done();
            states.push(snapshot.state.to_data());
            if done {
                break;
            }
        }
        Ok(states)
    };
    assert_eq!(run(5)?, run(5)?);
    assert_ne!(run(5)?, run(6)?);
    Ok(())
}
