use candle_core::Tensor;
use derive_more::{Deref, DerefMut, Display};

/// Action values for one observation, rank 1 with one entry per action.
#[derive(Deref, DerefMut, Debug, Display)]
pub struct QValues(pub Tensor);

/// Bootstrapped regression target, detached from the graph.
#[derive(Deref, DerefMut, Debug, Display)]
pub struct TdTarget(pub Tensor);

#[derive(Deref, DerefMut, Debug, Display)]
pub struct TdLoss(pub Tensor);
