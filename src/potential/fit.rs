//! # 读出层拟合
//!
//! 对参考能量做岭回归，求解线性读出层权重：
//! (XᵀX + λI) w = Xᵀy，X 的每行为一个结构的特征向量。
//!
//! ## 依赖关系
//! - 被 `commands/train.rs` 使用
//! - 使用 `potential/{model, descriptor}.rs`
//! - 使用 `nalgebra` 求解正规方程

use crate::error::{PotkitError, Result};
use crate::models::Structure;
use crate::potential::descriptor::{structure_features, RadialBasis};
use crate::potential::model::{ModelInfo, PotentialModel};
use nalgebra::{Cholesky, DMatrix, DVector};
use std::collections::BTreeSet;

/// 在给定帧子集上拟合读出层，返回完整模型
///
/// 元素表取全部帧出现过的元素并集（字典序），保证同一数据集
/// 上重复拟合得到相同的权重布局。
pub fn fit_readout(
    name: &str,
    cutoff: f64,
    basis: RadialBasis,
    frames: &[Structure],
    train_indices: &[usize],
    ridge: f64,
) -> Result<PotentialModel> {
    if train_indices.is_empty() {
        return Err(PotkitError::InvalidArgument(
            "training subset is empty".to_string(),
        ));
    }

    let species: Vec<String> = frames
        .iter()
        .flat_map(|f| f.symbols.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let info = ModelInfo {
        name: name.to_string(),
        energy_unit: "eV".to_string(),
        length_unit: "angstrom".to_string(),
        cutoff,
        species,
    };

    let dim = info.species.len() * info.species.len() * basis.n_radial + info.species.len();
    let mut design = DMatrix::zeros(train_indices.len(), dim);
    let mut targets = DVector::zeros(train_indices.len());

    for (row, &idx) in train_indices.iter().enumerate() {
        let frame = frames.get(idx).ok_or_else(|| PotkitError::InvalidSplit(
            format!("training index {} out of range ({} frames)", idx, frames.len()),
        ))?;
        let energy = frame
            .energy
            .ok_or(PotkitError::MissingEnergy { frame: idx })?;

        let features = structure_features(frame, &info.species, cutoff, &basis)?;
        design.set_row(row, &features.transpose());
        targets[row] = energy;
    }

    // 正规方程 + 岭正则
    let mut normal = design.transpose() * &design;
    for d in 0..dim {
        normal[(d, d)] += ridge;
    }
    let rhs = design.transpose() * targets;

    let cholesky = Cholesky::new(normal).ok_or_else(|| {
        PotkitError::LinearAlgebra(
            "normal equations are not positive definite; increase --ridge".to_string(),
        )
    })?;
    let flat = cholesky.solve(&rhs);

    PotentialModel::from_flat_weights(info, basis, &flat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::potential::calculator::{Calculator, ModelCalculator};
    use crate::potential::model::ModelInfo;
    use std::collections::BTreeMap;

    /// 人造参考模型，用它标注能量后再拟合
    fn reference_model() -> PotentialModel {
        let mut weights = BTreeMap::new();
        weights.insert("H".to_string(), vec![0.25, -0.12, 0.4, 0.07]);
        weights.insert("O".to_string(), vec![-0.3, 0.2, -0.15, 0.09]);
        let mut intercepts = BTreeMap::new();
        intercepts.insert("H".to_string(), -0.8);
        intercepts.insert("O".to_string(), -1.7);

        PotentialModel {
            info: ModelInfo {
                name: "reference".to_string(),
                energy_unit: "eV".to_string(),
                length_unit: "angstrom".to_string(),
                cutoff: 4.0,
                species: vec!["H".to_string(), "O".to_string()],
            },
            descriptor: RadialBasis {
                n_radial: 2,
                sigma: 0.5,
            },
            weights,
            intercepts,
        }
    }

    fn labelled_frames(n: usize) -> Vec<Structure> {
        let reference = ModelCalculator::new(reference_model());
        (0..n)
            .map(|i| {
                // 确定性几何扰动，覆盖不同键长与键角
                let t = i as f64 * 0.07;
                let mut s = Structure::new(
                    vec!["O".to_string(), "H".to_string(), "H".to_string()],
                    vec![
                        [0.0, 0.0, 0.1 + 0.02 * t],
                        [0.05 * t, 0.76 + 0.1 * (t * 1.3).sin(), -0.48],
                        [-0.03 * t, -0.76 - 0.08 * (t * 0.9).cos(), -0.45 + 0.05 * t],
                    ],
                );
                s.energy = Some(reference.potential_energy(&s).unwrap());
                s
            })
            .collect()
    }

    #[test]
    fn test_fit_recovers_reference_predictions() {
        let frames = labelled_frames(30);
        let train: Vec<usize> = (0..24).collect();

        let fitted = fit_readout(
            "fitted",
            4.0,
            RadialBasis { n_radial: 2, sigma: 0.5 },
            &frames,
            &train,
            1e-10,
        )
        .unwrap();
        let calc = ModelCalculator::new(fitted);

        // 留出的几何上预测也应重现参考能量
        for frame in &frames[24..] {
            let predicted = calc.potential_energy(frame).unwrap();
            let target = frame.energy.unwrap();
            assert!(
                (predicted - target).abs() < 1e-4,
                "predicted {} vs target {}",
                predicted,
                target
            );
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let frames = labelled_frames(12);
        let train: Vec<usize> = (0..12).collect();
        let basis = RadialBasis { n_radial: 2, sigma: 0.5 };

        let a = fit_readout("a", 4.0, basis, &frames, &train, 1e-8).unwrap();
        let b = fit_readout("b", 4.0, basis, &frames, &train, 1e-8).unwrap();
        assert_eq!(a.flat_weights(), b.flat_weights());
    }

    #[test]
    fn test_fit_empty_training_set() {
        let frames = labelled_frames(3);
        let result = fit_readout(
            "empty",
            4.0,
            RadialBasis { n_radial: 2, sigma: 0.5 },
            &frames,
            &[],
            1e-8,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_fit_missing_energy() {
        let mut frames = labelled_frames(5);
        frames[2].energy = None;
        let train: Vec<usize> = (0..5).collect();
        let result = fit_readout(
            "missing",
            4.0,
            RadialBasis { n_radial: 2, sigma: 0.5 },
            &frames,
            &train,
            1e-8,
        );
        assert!(matches!(result, Err(PotkitError::MissingEnergy { frame: 2 })));
    }
}
