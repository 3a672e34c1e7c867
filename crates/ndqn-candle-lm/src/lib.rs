pub mod device;
pub mod mlp;
pub mod optimizer;
pub mod q_network;
pub mod tensors;
