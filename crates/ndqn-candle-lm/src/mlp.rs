use candle_core::{Result, Tensor};
use candle_nn::{Activation, Linear, Module, VarBuilder, linear};

/// A `Linear` that remembers its `VarBuilder` prefix, so parameters can be addressed by name.
#[derive(Debug, Clone)]
pub struct NamedLinear {
    layer: Linear,
    name: String,
    out_dim: usize,
}

impl NamedLinear {
    pub fn new(in_dim: usize, out_dim: usize, vb: &VarBuilder, name: &str) -> Result<Self> {
        Ok(Self {
            layer: linear(in_dim, out_dim, vb.pp(name))?,
            name: name.to_owned(),
            out_dim,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn out_dim(&self) -> usize {
        self.out_dim
    }
}

impl Module for NamedLinear {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        self.layer.forward(xs)
    }
}

/// Fully connected stack. Every hidden layer is followed by `activation`, the head is affine so
/// its outputs can take any sign. Layers are named `{prefix}1`, `{prefix}2`, ... in order, the
/// head gets the last number.
#[derive(Debug, Clone)]
pub struct Mlp {
    hidden: Vec<NamedLinear>,
    head: NamedLinear,
    activation: Activation,
}

impl Mlp {
    pub fn new(
        input_dim: usize,
        hidden_sizes: &[usize],
        output_dim: usize,
        activation: Activation,
        vb: &VarBuilder,
        prefix: &str,
    ) -> Result<Self> {
        let mut in_dim = input_dim;
        let mut hidden = Vec::with_capacity(hidden_sizes.len());
        for (idx, size) in hidden_sizes.iter().enumerate() {
            hidden.push(NamedLinear::new(in_dim, *size, vb, &format!("{prefix}{}", idx + 1))?);
            in_dim = *size;
        }
        let head_name = format!("{prefix}{}", hidden_sizes.len() + 1);
        let head = NamedLinear::new(in_dim, output_dim, vb, &head_name)?;
        Ok(Self {
            hidden,
            head,
            activation,
        })
    }

    pub fn layers(&self) -> impl Iterator<Item = &NamedLinear> {
        self.hidden.iter().chain(std::iter::once(&self.head))
    }

    pub fn output_dim(&self) -> usize {
        self.head.out_dim()
    }
}

impl Module for Mlp {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let features = self.hidden.iter().try_fold(xs.clone(), |xs, layer| {
            layer.forward(&xs)?.apply(&self.activation)
        })?;
        self.head.forward(&features)
    }
}

#[cfg(test)]
mod tests {
    use super::Mlp;
    use candle_core::{DType, Device, Result, Tensor};
    use candle_nn::{Activation, Module, VarBuilder, VarMap};

    #[test]
    fn layer_names_and_output_shape() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let net = Mlp::new(4, &[16, 8], 3, Activation::Relu, &vb, "fc")?;
        let names: Vec<&str> = net.layers().map(|l| l.name()).collect();
        assert_eq!(names, vec!["fc1", "fc2", "fc3"]);
        assert_eq!(net.output_dim(), 3);
        let xs = Tensor::zeros((5, 4), DType::F32, &Device::Cpu)?;
        assert_eq!(net.forward(&xs)?.dims(), &[5, 3]);
        assert_eq!(varmap.all_vars().len(), 6);
        Ok(())
    }

    #[test]
    fn head_is_not_rectified() -> Result<()> {
        let mut varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let net = Mlp::new(2, &[4], 1, Activation::Relu, &vb, "fc")?;
        varmap.set_one("fc2.weight", Tensor::zeros((1, 4), DType::F32, &Device::Cpu)?)?;
        varmap.set_one("fc2.bias", Tensor::new(&[-3f32], &Device::Cpu)?)?;
        let out = net.forward(&Tensor::ones((1, 2), DType::F32, &Device::Cpu)?)?;
        assert_eq!(out.flatten_all()?.to_vec1::<f32>()?, vec![-3.]);
        Ok(())
    }
}
