pub mod dqn;
pub mod exploration;
