use candle_core::{Result, Tensor, backprop::GradStore};
use candle_nn::{AdamW, Optimizer, ParamsAdamW, VarMap};
use std::fmt::Debug;

/// Rescales the gradients so that their global L2 norm is at most `max_norm`.
pub fn clip_grad(loss: &Tensor, varmap: &VarMap, max_norm: f32) -> Result<GradStore> {
    let mut grad_store = loss.backward()?;
    let all_vars = varmap.all_vars();
    let mut total_norm_squared = 0.0f32;
    for var in all_vars.iter() {
        if let Some(grad) = grad_store.get(var.as_tensor()) {
            total_norm_squared += grad.sqr()?.sum_all()?.to_scalar::<f32>()?;
        }
    }
    let total_norm = total_norm_squared.sqrt();
    if total_norm > max_norm {
        let clip_coef = (max_norm / (total_norm + 1e-6)) as f64;
        for var in all_vars.iter() {
            let clipped = match grad_store.get(var.as_tensor()) {
                Some(grad) => grad.affine(clip_coef, 0.)?,
                None => continue,
            };
            grad_store.insert(var.as_tensor(), clipped);
        }
    }
    Ok(grad_store)
}

/// Plain Adam, expressed through candle's `AdamW` with the decoupled weight decay switched off.
pub fn adam_params(learning_rate: f64) -> ParamsAdamW {
    ParamsAdamW {
        lr: learning_rate,
        beta1: 0.9,
        beta2: 0.999,
        eps: 1e-8,
        weight_decay: 0.0,
    }
}

pub struct OptimizerWithMaxGrad {
    pub optimizer: AdamW,
    pub max_grad_norm: Option<f32>,
    pub varmap: VarMap,
}

impl Debug for OptimizerWithMaxGrad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimizerWithMaxGrad")
            .field("learning_rate", &self.optimizer.learning_rate())
            .field("max_grad_norm", &self.max_grad_norm)
            .finish()
    }
}

impl OptimizerWithMaxGrad {
    pub fn adam(varmap: VarMap, learning_rate: f64, max_grad_norm: Option<f32>) -> Result<Self> {
        let optimizer = AdamW::new(varmap.all_vars(), adam_params(learning_rate))?;
        Ok(Self {
            optimizer,
            max_grad_norm,
            varmap,
        })
    }

    pub fn learning_rate(&self) -> f64 {
        self.optimizer.learning_rate()
    }

    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        let grads = if let Some(max_norm) = self.max_grad_norm {
            clip_grad(loss, &self.varmap, max_norm)?
        } else {
            loss.backward()?
        };
        self.optimizer.step(&grads)
    }
}

#[cfg(test)]
mod tests {
    use super::clip_grad;
    use candle_core::{DType, Device, Result, Tensor};
    use candle_nn::{Init, VarMap};

    #[test]
    fn clipping_bounds_the_global_norm() -> Result<()> {
        let varmap = VarMap::new();
        let w = varmap.get(3, "w", Init::Const(1.), DType::F32, &Device::Cpu)?;
        let xs = Tensor::new(&[30f32, 40., 0.], &Device::Cpu)?;
        // d(sum(w * xs))/dw = xs, norm 50
        let loss = w.mul(&xs)?.sum_all()?;
        let grads = clip_grad(&loss, &varmap, 5.0)?;
        let grad = grads.get(&w).expect("w has a gradient");
        let norm = grad.sqr()?.sum_all()?.sqrt()?.to_scalar::<f32>()?;
        assert!((norm - 5.0).abs() < 1e-3, "norm was {norm}");
        Ok(())
    }
}
