//! # 能量/受力计算器
//!
//! `Calculator` 是对一个原子结构求势能与受力的统一接口；
//! `ModelCalculator` 用加载的势模型实现它：能量为结构特征与
//! 展平权重的点积，受力由径向基的解析导数按原子对累加。
//!
//! ## 依赖关系
//! - 被 `dynamics/`, `uq/`, `commands/` 使用
//! - 使用 `potential/{model, descriptor, neighbors}.rs`

use crate::error::Result;
use crate::models::Structure;
use crate::potential::model::PotentialModel;
use crate::potential::neighbors::NeighborList;
use std::path::Path;

/// 一次计算的结果
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// 势能 (eV)
    pub energy: f64,
    /// 每原子受力 (eV/Å)
    pub forces: Vec<[f64; 3]>,
}

/// 对原子结构求势能与受力的接口
pub trait Calculator {
    fn evaluate(&self, structure: &Structure) -> Result<Evaluation>;

    fn potential_energy(&self, structure: &Structure) -> Result<f64> {
        Ok(self.evaluate(structure)?.energy)
    }

    fn forces(&self, structure: &Structure) -> Result<Vec<[f64; 3]>> {
        Ok(self.evaluate(structure)?.forces)
    }
}

/// 由势模型支撑的计算器
pub struct ModelCalculator {
    model: PotentialModel,
}

impl ModelCalculator {
    pub fn new(model: PotentialModel) -> Self {
        ModelCalculator { model }
    }

    /// 从模型文件路径创建
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(ModelCalculator {
            model: PotentialModel::load(path)?,
        })
    }

    pub fn model(&self) -> &PotentialModel {
        &self.model
    }
}

impl Calculator for ModelCalculator {
    fn evaluate(&self, structure: &Structure) -> Result<Evaluation> {
        let model = &self.model;
        let n_radial = model.descriptor.n_radial;
        let cutoff = model.info.cutoff;

        let species_ids: Vec<usize> = structure
            .symbols
            .iter()
            .map(|s| model.species_index(s))
            .collect::<Result<_>>()?;

        // 基线能量
        let mut energy = 0.0;
        for symbol in &structure.symbols {
            energy += model.intercepts[symbol];
        }

        let mut forces = vec![[0.0; 3]; structure.len()];
        let neighbor_list = NeighborList::build(structure, cutoff)?;

        for pair in &neighbor_list.pairs {
            let si = species_ids[pair.i];
            let sj = species_ids[pair.j];
            let w_i = &model.weights[&structure.symbols[pair.i]];
            let w_j = &model.weights[&structure.symbols[pair.j]];

            let (values, derivatives) =
                model.descriptor.values_and_derivatives(pair.distance, cutoff);

            // 该对对能量的贡献同时进入 i 和 j 的中心块
            let mut de_dr = 0.0;
            for k in 0..n_radial {
                let coeff = w_i[sj * n_radial + k] + w_j[si * n_radial + k];
                energy += coeff * values[k];
                de_dr += coeff * derivatives[k];
            }

            // F_i = -∂E/∂r_i = de_dr * û_ij
            for axis in 0..3 {
                forces[pair.i][axis] += de_dr * pair.unit[axis];
                forces[pair.j][axis] -= de_dr * pair.unit[axis];
            }
        }

        Ok(Evaluation { energy, forces })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::potential::descriptor::{structure_features, RadialBasis};
    use crate::potential::model::ModelInfo;
    use std::collections::BTreeMap;

    fn toy_model() -> PotentialModel {
        let species = vec!["H".to_string(), "O".to_string()];
        let mut weights = BTreeMap::new();
        weights.insert("H".to_string(), vec![0.3, -0.1, 0.05, 0.2]);
        weights.insert("O".to_string(), vec![-0.4, 0.15, -0.02, 0.1]);
        let mut intercepts = BTreeMap::new();
        intercepts.insert("H".to_string(), -0.5);
        intercepts.insert("O".to_string(), -2.0);

        PotentialModel {
            info: ModelInfo {
                name: "toy".to_string(),
                energy_unit: "eV".to_string(),
                length_unit: "angstrom".to_string(),
                cutoff: 4.0,
                species,
            },
            descriptor: RadialBasis {
                n_radial: 2,
                sigma: 0.5,
            },
            weights,
            intercepts,
        }
    }

    fn water_like() -> Structure {
        Structure::new(
            vec!["O".to_string(), "H".to_string(), "H".to_string()],
            vec![
                [0.0, 0.05, 0.12],
                [0.03, 0.76, -0.48],
                [-0.02, -0.77, -0.46],
            ],
        )
    }

    #[test]
    fn test_energy_matches_feature_dot_product() {
        let model = toy_model();
        let calc = ModelCalculator::new(model.clone());
        let s = water_like();

        let energy = calc.potential_energy(&s).unwrap();
        let features =
            structure_features(&s, &model.info.species, model.info.cutoff, &model.descriptor)
                .unwrap();
        let dot = model.flat_weights().dot(&features);

        assert!(
            (energy - dot).abs() < 1e-10,
            "pairwise energy {} vs feature dot {}",
            energy,
            dot
        );
    }

    #[test]
    fn test_forces_match_finite_difference() {
        let calc = ModelCalculator::new(toy_model());
        let s = water_like();
        let forces = calc.forces(&s).unwrap();

        let h = 1e-6;
        for atom in 0..s.len() {
            for axis in 0..3 {
                let mut plus = s.clone();
                plus.positions[atom][axis] += h;
                let mut minus = s.clone();
                minus.positions[atom][axis] -= h;

                let numeric = -(calc.potential_energy(&plus).unwrap()
                    - calc.potential_energy(&minus).unwrap())
                    / (2.0 * h);
                assert!(
                    (forces[atom][axis] - numeric).abs() < 1e-5,
                    "atom {} axis {}: analytic {} vs numeric {}",
                    atom,
                    axis,
                    forces[atom][axis],
                    numeric
                );
            }
        }
    }

    #[test]
    fn test_forces_sum_to_zero() {
        let calc = ModelCalculator::new(toy_model());
        let forces = calc.forces(&water_like()).unwrap();

        for axis in 0..3 {
            let total: f64 = forces.iter().map(|f| f[axis]).sum();
            assert!(total.abs() < 1e-12);
        }
    }

    #[test]
    fn test_isolated_atoms_give_intercepts() {
        let calc = ModelCalculator::new(toy_model());
        let s = Structure::new(
            vec!["O".to_string(), "H".to_string()],
            vec![[0.0, 0.0, 0.0], [100.0, 0.0, 0.0]],
        );
        // 远超截断半径，只剩基线能量
        let energy = calc.potential_energy(&s).unwrap();
        assert!((energy - (-2.5)).abs() < 1e-12);
    }

    #[test]
    fn test_unsupported_species_rejected() {
        let calc = ModelCalculator::new(toy_model());
        let s = Structure::new(vec!["C".to_string()], vec![[0.0; 3]]);
        assert!(calc.evaluate(&s).is_err());
    }
}
