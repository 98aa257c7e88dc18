use super::{create_linear_layers, mlp_forward, MlpConfig};
use crate::model::{SubModel1, SubModel2};
use anyhow::{Context, Result};
use candle_core::{Device, Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};

/// Multilayer perceptron with ReLU activation function.
///
/// As a [`SubModel2`], the two inputs are concatenated along the last axis,
/// which is how an action-value function takes an observation and an action.
#[derive(Clone)]
pub struct Mlp {
    config: MlpConfig,
    device: Device,
    hidden: Vec<Linear>,
    out: Linear,
}

fn build(vb: VarBuilder, config: MlpConfig) -> Result<Mlp> {
    let device = vb.device().clone();
    let mut dims = vec![config.in_dim];
    dims.extend(config.units.iter());
    dims.push(config.out_dim);
    let mut layers = create_linear_layers("mlp", vb, &dims)?;
    let out = layers.pop().context("Mlp has no layer")?;

    Ok(Mlp {
        config,
        device,
        hidden: layers,
        out,
    })
}

impl Mlp {
    fn forward_(&self, xs: Tensor) -> Result<Tensor> {
        let xs = mlp_forward(xs, &self.hidden)?;
        let xs = self.out.forward(&xs)?;

        match self.config.activation_out {
            false => Ok(xs),
            true => Ok(xs.relu()?),
        }
    }
}

impl SubModel1 for Mlp {
    type Config = MlpConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn forward(&self, xs: &Self::Input) -> Result<Tensor> {
        self.forward_(xs.to_device(&self.device)?)
    }

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        build(vb, config)
    }
}

impl SubModel2 for Mlp {
    type Config = MlpConfig;
    type Input1 = Tensor;
    type Input2 = Tensor;
    type Output = Tensor;

    fn forward(&self, input1: &Self::Input1, input2: &Self::Input2) -> Result<Self::Output> {
        let input1 = input1.to_device(&self.device)?;
        let input2 = input2.to_device(&self.device)?;
        let input = Tensor::cat(&[input1, input2], D::Minus1)?;
        self.forward_(input)
    }

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        build(vb, config)
    }
}
