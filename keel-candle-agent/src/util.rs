//! Utilities.
use anyhow::{anyhow, Result};
use candle_core::Var;
use candle_nn::VarMap;
use std::{
    collections::HashMap,
    sync::MutexGuard,
};

/// Interface for handling output dimensions.
pub trait OutDim {
    /// Returns the output dimension.
    fn get_out_dim(&self) -> usize;

    /// Sets the output dimension.
    fn set_out_dim(&mut self, v: usize);
}

fn lock(varmap: &VarMap) -> Result<MutexGuard<'_, HashMap<String, Var>>> {
    varmap
        .data()
        .lock()
        .map_err(|e| anyhow!("Failed to lock VarMap: {}", e))
}

/// Apply soft update on variables.
///
/// Variables are identified by their names.
///
/// dest = tau * src + (1.0 - tau) * dest
pub fn track(dest: &VarMap, src: &VarMap, tau: f64) -> Result<()> {
    let dest = lock(dest)?;
    let src = lock(src)?;

    for (k, v_dest) in dest.iter() {
        let v_src = src
            .get(k)
            .ok_or_else(|| anyhow!("Variable {} is not in the source", k))?;
        let t = ((tau * v_src.as_tensor())? + (1.0 - tau) * v_dest.as_tensor())?;
        v_dest.set(&t)?;
    }

    Ok(())
}

/// Copies the values of the variables in `src` to those with the same names in `dest`.
pub fn copy_vars(dest: &VarMap, src: &VarMap) -> Result<()> {
    let dest = lock(dest)?;
    let src = lock(src)?;

    for (k, v_dest) in dest.iter() {
        let v_src = src
            .get(k)
            .ok_or_else(|| anyhow!("Variable {} is not in the source", k))?;
        v_dest.set(v_src.as_tensor())?;
    }

    Ok(())
}

/// Returns the variables of a [`VarMap`] sorted by name.
pub fn named_vars(varmap: &VarMap) -> Result<Vec<(String, Var)>> {
    let mut vars = lock(varmap)?
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect::<Vec<_>>();
    vars.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device, Tensor};
    use candle_nn::Init;

    fn varmap(values: &[f32]) -> Result<VarMap> {
        let vm = VarMap::new();
        let init = Init::Randn {
            mean: 0.0,
            stdev: 1.0,
        };
        vm.get((values.len(),), "var1", init, DType::F32, &Device::Cpu)?;
        let t = Tensor::from_slice(values, (values.len(),), &Device::Cpu)?;
        lock(&vm)?["var1"].set(&t)?;
        Ok(vm)
    }

    fn values(vm: &VarMap) -> Result<Vec<f32>> {
        Ok(lock(vm)?["var1"].as_tensor().to_vec1::<f32>()?)
    }

    #[test]
    fn test_track() -> Result<()> {
        let tau = 0.7;
        let vm_src = varmap(&[1.0, 2.0, 3.0])?;
        let vm_dest = varmap(&[4.0, 5.0, 6.0])?;
        track(&vm_dest, &vm_src, tau)?;

        let expected = [1.9f32, 2.9, 3.9];
        for (v, e) in values(&vm_dest)?.iter().zip(expected.iter()) {
            assert!((v - e).abs() < 1e-6);
        }
        Ok(())
    }

    #[test]
    fn test_track_extremes() -> Result<()> {
        let vm_src = varmap(&[1.0, 2.0])?;
        let vm_dest = varmap(&[4.0, 5.0])?;
        track(&vm_dest, &vm_src, 0.0)?;
        assert_eq!(values(&vm_dest)?, vec![4.0, 5.0]);
        track(&vm_dest, &vm_src, 1.0)?;
        assert_eq!(values(&vm_dest)?, vec![1.0, 2.0]);
        Ok(())
    }

    #[test]
    fn test_copy_vars() -> Result<()> {
        let vm_src = varmap(&[1.5, -2.0])?;
        let vm_dest = varmap(&[0.0, 0.0])?;
        copy_vars(&vm_dest, &vm_src)?;
        assert_eq!(values(&vm_dest)?, vec![1.5, -2.0]);

        // Storage is not shared
        lock(&vm_src)?["var1"].set(&Tensor::new(&[7f32, 7.], &Device::Cpu)?)?;
        assert_eq!(values(&vm_dest)?, vec![1.5, -2.0]);
        Ok(())
    }

    #[test]
    fn test_missing_variable() -> Result<()> {
        let vm_src = VarMap::new();
        let vm_dest = varmap(&[0.0])?;
        assert!(track(&vm_dest, &vm_src, 0.5).is_err());
        Ok(())
    }
}
