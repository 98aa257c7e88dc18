use super::{create_linear_layers, mlp_forward, MlpConfig};
use crate::model::SubModel1;
use anyhow::Result;
use candle_core::{Device, Module, Tensor};
use candle_nn::{linear, Linear, VarBuilder};

/// Multilayer perceptron that outputs two tensors of the same size.
///
/// The outputs are the mean and the log standard deviation of a Gaussian.
#[derive(Clone)]
pub struct Mlp2 {
    device: Device,
    head_mean: Linear,
    head_lstd: Linear,
    layers: Vec<Linear>,
}

impl SubModel1 for Mlp2 {
    type Config = MlpConfig;
    type Input = Tensor;
    type Output = (Tensor, Tensor);

    fn forward(&self, xs: &Self::Input) -> Result<Self::Output> {
        let xs = xs.to_device(&self.device)?;
        let xs = mlp_forward(xs, &self.layers)?;
        let mean = self.head_mean.forward(&xs)?;
        let lstd = self.head_lstd.forward(&xs)?;
        Ok((mean, lstd))
    }

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        let device = vb.device().clone();
        let mut dims = vec![config.in_dim];
        dims.extend(config.units.iter());
        let layers = create_linear_layers("mlp", vb.clone(), &dims)?;
        let in_dim = *dims.last().unwrap_or(&config.in_dim);
        let head_mean = linear(in_dim, config.out_dim, vb.pp("mean"))?;
        let head_lstd = linear(in_dim, config.out_dim, vb.pp("log_std"))?;

        Ok(Self {
            device,
            head_mean,
            head_lstd,
            layers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;
    use candle_nn::VarMap;

    #[test]
    fn test_mlp2_heads() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let mlp = Mlp2::build(vb, MlpConfig::new(3, vec![16, 16], 2, false))?;
        let (mean, lstd) = mlp.forward(&Tensor::zeros((7, 3), DType::F32, &Device::Cpu)?)?;
        assert_eq!(mean.dims(), [7, 2]);
        assert_eq!(lstd.dims(), [7, 2]);

        let names = varmap.data().lock().unwrap().keys().cloned().collect::<Vec<_>>();
        assert!(names.contains(&"mean.weight".to_string()));
        assert!(names.contains(&"log_std.bias".to_string()));
        Ok(())
    }
}
