//! # 势模型文件
//!
//! 模型以 TOML 文档序列化：`[model]` 元数据（名称、单位、截断半径、
//! 元素列表）、`[descriptor]` 径向基参数、`[weights]` 每个中心元素
//! 一条展平的读出权重向量、`[intercepts]` 每元素基线能量。
//!
//! 所有权重块与截距按元素顺序拼接即为模型的“最后一层”权重向量，
//! 其长度就是 LLPR 的特征维数。
//!
//! ## 依赖关系
//! - 被 `potential/calculator.rs`, `potential/fit.rs`, `uq/llpr.rs` 使用
//! - 使用 `serde` + `toml` 序列化

use crate::error::{PotkitError, Result};
use crate::potential::descriptor::RadialBasis;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

fn default_energy_unit() -> String {
    "eV".to_string()
}

fn default_length_unit() -> String {
    "angstrom".to_string()
}

/// 模型元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// 模型名称
    pub name: String,

    /// 能量单位（仅元数据，内部始终按 eV 处理）
    #[serde(default = "default_energy_unit")]
    pub energy_unit: String,

    /// 长度单位（仅元数据，内部始终按 Å 处理）
    #[serde(default = "default_length_unit")]
    pub length_unit: String,

    /// 描述符截断半径 (Å)
    pub cutoff: f64,

    /// 覆盖的元素，顺序决定权重块布局
    pub species: Vec<String>,
}

/// 机器学习势模型
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotentialModel {
    #[serde(rename = "model")]
    pub info: ModelInfo,

    /// 径向基参数
    pub descriptor: RadialBasis,

    /// 每个中心元素的读出权重，长度 = n_species * n_radial
    pub weights: BTreeMap<String, Vec<f64>>,

    /// 每元素基线能量 (eV)
    pub intercepts: BTreeMap<String, f64>,
}

impl PotentialModel {
    /// 从 TOML 文件加载模型并校验
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PotkitError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| PotkitError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        let model: PotentialModel =
            toml::from_str(&content).map_err(|e| PotkitError::ModelError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        model
            .validate()
            .map_err(|reason| PotkitError::ModelError {
                path: path.display().to_string(),
                reason,
            })?;

        Ok(model)
    }

    /// 将模型保存为 TOML 文件
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| PotkitError::ModelError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        fs::write(path, content).map_err(|e| PotkitError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// 形状一致性校验
    fn validate(&self) -> std::result::Result<(), String> {
        if self.info.cutoff <= 0.0 {
            return Err(format!("cutoff must be positive, got {}", self.info.cutoff));
        }
        if self.info.species.is_empty() {
            return Err("species list is empty".to_string());
        }
        if self.descriptor.n_radial == 0 {
            return Err("descriptor needs at least one radial function".to_string());
        }
        if self.descriptor.sigma <= 0.0 {
            return Err(format!("sigma must be positive, got {}", self.descriptor.sigma));
        }

        let expected = self.per_atom_feature_len();
        for species in &self.info.species {
            match self.weights.get(species) {
                None => return Err(format!("missing weights for species '{}'", species)),
                Some(w) if w.len() != expected => {
                    return Err(format!(
                        "weights for '{}' have length {}, expected {}",
                        species,
                        w.len(),
                        expected
                    ))
                }
                _ => {}
            }
            if !self.intercepts.contains_key(species) {
                return Err(format!("missing intercept for species '{}'", species));
            }
        }

        for key in self.weights.keys() {
            if !self.info.species.contains(key) {
                return Err(format!("weights for unlisted species '{}'", key));
            }
        }

        Ok(())
    }

    pub fn n_species(&self) -> usize {
        self.info.species.len()
    }

    /// 元素在权重块布局中的序号
    pub fn species_index(&self, symbol: &str) -> Result<usize> {
        self.info
            .species
            .iter()
            .position(|s| s == symbol)
            .ok_or_else(|| PotkitError::UnsupportedSpecies(symbol.to_string()))
    }

    /// 单原子特征维数 = n_species * n_radial
    pub fn per_atom_feature_len(&self) -> usize {
        self.n_species() * self.descriptor.n_radial
    }

    /// 最后一层权重向量长度 = n_species * 单原子维数 + n_species
    pub fn feature_length(&self) -> usize {
        self.n_species() * self.per_atom_feature_len() + self.n_species()
    }

    /// 展平的最后一层权重向量：各元素权重块依序拼接，截距附后
    pub fn flat_weights(&self) -> DVector<f64> {
        let mut flat = Vec::with_capacity(self.feature_length());
        for species in &self.info.species {
            flat.extend_from_slice(&self.weights[species]);
        }
        for species in &self.info.species {
            flat.push(self.intercepts[species]);
        }
        DVector::from_vec(flat)
    }

    /// 由展平权重向量重建权重表（拟合后写回时使用）
    pub fn from_flat_weights(
        info: ModelInfo,
        descriptor: RadialBasis,
        flat: &DVector<f64>,
    ) -> Result<Self> {
        let n_species = info.species.len();
        let per_atom = n_species * descriptor.n_radial;
        let expected = n_species * per_atom + n_species;
        if flat.len() != expected {
            return Err(PotkitError::LengthMismatch {
                what: "flat weight vector".to_string(),
                expected,
                actual: flat.len(),
            });
        }

        let mut weights = BTreeMap::new();
        let mut intercepts = BTreeMap::new();
        for (i, species) in info.species.iter().enumerate() {
            let start = i * per_atom;
            weights.insert(
                species.clone(),
                flat.as_slice()[start..start + per_atom].to_vec(),
            );
            intercepts.insert(species.clone(), flat[n_species * per_atom + i]);
        }

        Ok(PotentialModel {
            info,
            descriptor,
            weights,
            intercepts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_model() -> PotentialModel {
        let mut weights = BTreeMap::new();
        weights.insert("H".to_string(), vec![0.1; 4]);
        weights.insert("O".to_string(), vec![-0.2; 4]);
        let mut intercepts = BTreeMap::new();
        intercepts.insert("H".to_string(), -0.5);
        intercepts.insert("O".to_string(), -2.0);

        PotentialModel {
            info: ModelInfo {
                name: "toy".to_string(),
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

    #[test]
    fn test_feature_lengths() {
        let model = toy_model();
        assert_eq!(model.per_atom_feature_len(), 4);
        // 2 * 4 + 2 截距
        assert_eq!(model.feature_length(), 10);
    }

    #[test]
    fn test_toml_round_trip() {
        let model = toy_model();
        let text = toml::to_string_pretty(&model).unwrap();
        let reparsed: PotentialModel = toml::from_str(&text).unwrap();

        assert_eq!(reparsed.info.species, model.info.species);
        assert_eq!(reparsed.descriptor.n_radial, 2);
        assert_eq!(reparsed.weights["O"], model.weights["O"]);
        assert!((reparsed.intercepts["H"] - (-0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_validate_wrong_weight_length() {
        let mut model = toy_model();
        model.weights.insert("H".to_string(), vec![0.1; 3]);
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_validate_missing_intercept() {
        let mut model = toy_model();
        model.intercepts.remove("O");
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_species_index() {
        let model = toy_model();
        assert_eq!(model.species_index("O").unwrap(), 1);
        assert!(matches!(
            model.species_index("C"),
            Err(PotkitError::UnsupportedSpecies(_))
        ));
    }

    #[test]
    fn test_flat_weights_round_trip() {
        let model = toy_model();
        let flat = model.flat_weights();
        let rebuilt =
            PotentialModel::from_flat_weights(model.info.clone(), model.descriptor, &flat)
                .unwrap();

        assert_eq!(rebuilt.weights["H"], model.weights["H"]);
        assert!((rebuilt.intercepts["O"] - model.intercepts["O"]).abs() < 1e-12);
    }
}
