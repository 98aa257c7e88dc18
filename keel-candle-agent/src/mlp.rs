//! Multilayer perceptron.
mod base;
mod config;
mod mlp2;
use anyhow::Result;
pub use base::Mlp;
use candle_core::Tensor;
use candle_nn::{linear, Linear, Module, VarBuilder};
pub use config::MlpConfig;
pub use mlp2::Mlp2;

/// Returns linear layers mapping `dims[i]` to `dims[i + 1]`.
fn create_linear_layers(prefix: &str, vb: VarBuilder, dims: &[usize]) -> Result<Vec<Linear>> {
    let vb = vb.pp(prefix);
    dims.windows(2)
        .enumerate()
        .map(|(i, w)| -> Result<Linear> { Ok(linear(w[0], w[1], vb.pp(format!("ln{}", i)))?) })
        .collect()
}

/// Applies the layers with ReLU activation after every layer.
fn mlp_forward(xs: Tensor, layers: &[Linear]) -> Result<Tensor> {
    let mut xs = xs;
    for layer in layers.iter() {
        xs = layer.forward(&xs)?.relu()?;
    }
    Ok(xs)
}
