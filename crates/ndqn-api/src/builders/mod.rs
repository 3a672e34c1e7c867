pub mod dqn;
pub mod trainer;
