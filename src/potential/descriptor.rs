//! # 径向基描述符
//!
//! 带平滑截断的高斯径向基。高斯中心均匀分布在 (0, r_c) 内，
//! 截断函数 fc(r) = (1 + cos(πr/r_c)) / 2 保证特征及其导数在
//! r_c 处连续归零。
//!
//! 单原子特征按近邻元素分块累加基函数值；整体结构特征把单原子
//! 特征按中心元素分块求和，并附加每元素原子计数（截距列）。
//! 结构特征与模型展平权重的点积即为势能。
//!
//! ## 依赖关系
//! - 被 `potential/calculator.rs`, `potential/fit.rs`, `uq/llpr.rs` 使用
//! - 使用 `potential/neighbors.rs`

use crate::error::{PotkitError, Result};
use crate::models::Structure;
use crate::potential::neighbors::NeighborList;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// 径向基参数
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RadialBasis {
    /// 高斯函数个数
    pub n_radial: usize,

    /// 高斯宽度 (Å)
    pub sigma: f64,
}

impl RadialBasis {
    /// 第 k 个高斯中心 (Å)
    fn center(&self, k: usize, cutoff: f64) -> f64 {
        (k as f64 + 1.0) * cutoff / (self.n_radial as f64 + 1.0)
    }

    /// 在距离 r 处求基函数值
    pub fn values(&self, r: f64, cutoff: f64) -> Vec<f64> {
        let fc = cutoff_fn(r, cutoff);
        (0..self.n_radial)
            .map(|k| {
                let dr = r - self.center(k, cutoff);
                (-dr * dr / (2.0 * self.sigma * self.sigma)).exp() * fc
            })
            .collect()
    }

    /// 在距离 r 处求基函数值及其径向导数
    pub fn values_and_derivatives(&self, r: f64, cutoff: f64) -> (Vec<f64>, Vec<f64>) {
        let fc = cutoff_fn(r, cutoff);
        let dfc = cutoff_fn_derivative(r, cutoff);
        let inv_sigma_sq = 1.0 / (self.sigma * self.sigma);

        let mut values = Vec::with_capacity(self.n_radial);
        let mut derivatives = Vec::with_capacity(self.n_radial);
        for k in 0..self.n_radial {
            let dr = r - self.center(k, cutoff);
            let gaussian = (-dr * dr * 0.5 * inv_sigma_sq).exp();
            values.push(gaussian * fc);
            derivatives.push(gaussian * (dfc - dr * inv_sigma_sq * fc));
        }
        (values, derivatives)
    }
}

/// 截断函数 fc(r)
fn cutoff_fn(r: f64, cutoff: f64) -> f64 {
    if r >= cutoff {
        0.0
    } else {
        0.5 * (1.0 + (PI * r / cutoff).cos())
    }
}

/// 截断函数导数 fc'(r)
fn cutoff_fn_derivative(r: f64, cutoff: f64) -> f64 {
    if r >= cutoff {
        0.0
    } else {
        -0.5 * PI / cutoff * (PI * r / cutoff).sin()
    }
}

/// 元素在给定列表中的序号
fn species_index(species: &[String], symbol: &str) -> Result<usize> {
    species
        .iter()
        .position(|s| s == symbol)
        .ok_or_else(|| PotkitError::UnsupportedSpecies(symbol.to_string()))
}

/// 计算整体结构特征向量
///
/// 布局：对每个中心元素 s 一段长 n_species*n_radial 的块
/// （近邻元素分块），随后每元素一个原子计数列。
/// 维数 = n_species² * n_radial + n_species。
pub fn structure_features(
    structure: &Structure,
    species: &[String],
    cutoff: f64,
    basis: &RadialBasis,
) -> Result<DVector<f64>> {
    let n_species = species.len();
    let n_radial = basis.n_radial;
    let per_atom = n_species * n_radial;
    let mut features = DVector::zeros(n_species * per_atom + n_species);

    let species_ids: Vec<usize> = structure
        .symbols
        .iter()
        .map(|s| species_index(species, s))
        .collect::<Result<_>>()?;

    // 截距列：每元素原子计数
    for &si in &species_ids {
        features[n_species * per_atom + si] += 1.0;
    }

    let neighbor_list = NeighborList::build(structure, cutoff)?;
    for pair in &neighbor_list.pairs {
        let si = species_ids[pair.i];
        let sj = species_ids[pair.j];
        let values = basis.values(pair.distance, cutoff);
        for (k, &g) in values.iter().enumerate() {
            features[si * per_atom + sj * n_radial + k] += g;
            features[sj * per_atom + si * n_radial + k] += g;
        }
    }

    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basis() -> RadialBasis {
        RadialBasis {
            n_radial: 4,
            sigma: 0.5,
        }
    }

    #[test]
    fn test_values_vanish_at_cutoff() {
        let b = basis();
        for v in b.values(4.0, 4.0) {
            assert_eq!(v, 0.0);
        }
        for v in b.values(5.0, 4.0) {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn test_values_positive_inside() {
        let b = basis();
        let values = b.values(1.5, 4.0);
        assert_eq!(values.len(), 4);
        assert!(values.iter().all(|&v| v > 0.0));
    }

    #[test]
    fn test_derivatives_match_finite_difference() {
        let b = basis();
        let cutoff = 4.0;
        let h = 1e-6;

        for &r in &[0.5, 1.2, 2.7, 3.9] {
            let (_, derivs) = b.values_and_derivatives(r, cutoff);
            let plus = b.values(r + h, cutoff);
            let minus = b.values(r - h, cutoff);
            for k in 0..b.n_radial {
                let numeric = (plus[k] - minus[k]) / (2.0 * h);
                assert!(
                    (derivs[k] - numeric).abs() < 1e-6,
                    "r={} k={}: analytic {} vs numeric {}",
                    r,
                    k,
                    derivs[k],
                    numeric
                );
            }
        }
    }

    #[test]
    fn test_structure_features_dimension_and_counts() {
        let species = vec!["H".to_string(), "O".to_string()];
        let structure = Structure::new(
            vec!["O".to_string(), "H".to_string(), "H".to_string()],
            vec![
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 0.96],
                [0.93, 0.0, -0.24],
            ],
        );

        let features = structure_features(&structure, &species, 4.0, &basis()).unwrap();
        // 2² * 4 + 2 = 18
        assert_eq!(features.len(), 18);

        // 计数列：H=2, O=1
        assert!((features[16] - 2.0).abs() < 1e-12);
        assert!((features[17] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_structure_features_translation_invariant() {
        let species = vec!["H".to_string()];
        let s1 = Structure::new(
            vec!["H".to_string(), "H".to_string()],
            vec![[0.0, 0.0, 0.0], [0.8, 0.0, 0.0]],
        );
        let mut s2 = s1.clone();
        for p in &mut s2.positions {
            p[0] += 3.0;
            p[1] -= 1.0;
        }

        let b = basis();
        let f1 = structure_features(&s1, &species, 4.0, &b).unwrap();
        let f2 = structure_features(&s2, &species, 4.0, &b).unwrap();
        assert!((f1 - f2).norm() < 1e-12);
    }

    #[test]
    fn test_structure_features_unknown_species() {
        let species = vec!["H".to_string()];
        let structure = Structure::new(vec!["He".to_string()], vec![[0.0; 3]]);
        assert!(matches!(
            structure_features(&structure, &species, 4.0, &basis()),
            Err(PotkitError::UnsupportedSpecies(_))
        ));
    }
}
