//! # 原子结构数据模型
//!
//! 定义统一的原子结构表示：元素符号、笛卡尔坐标、可选晶胞、
//! 可选动量以及计算结果（能量、受力）。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `potential/`, `dynamics/` 使用
//! - 使用 `utils/units.rs` 的质量表

use crate::error::Result;
use crate::utils::units;
use serde::{Deserialize, Serialize};

/// 晶胞表示
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶胞向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶胞向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 计算晶胞体积
    pub fn volume(&self) -> f64 {
        let a = self.matrix[0];
        let b = self.matrix[1];
        let c = self.matrix[2];

        // 行列式计算
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }

    /// 各晶胞向量长度 (a, b, c)
    pub fn lengths(&self) -> (f64, f64, f64) {
        let norm = |v: [f64; 3]| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        (
            norm(self.matrix[0]),
            norm(self.matrix[1]),
            norm(self.matrix[2]),
        )
    }
}

/// 原子结构
///
/// 所有并行数组按原子索引对齐；坐标为笛卡尔坐标 (Å)，
/// 能量为 eV，受力为 eV/Å，动量为 amu·Å/内部时间单位。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    /// 元素符号列表
    pub symbols: Vec<String>,

    /// 笛卡尔坐标 (Å)
    pub positions: Vec<[f64; 3]>,

    /// 可选晶胞（None 表示自由边界）
    pub cell: Option<Lattice>,

    /// 各方向周期性
    pub pbc: [bool; 3],

    /// 可选动量
    pub momenta: Option<Vec<[f64; 3]>>,

    /// 附着的势能 (eV)
    pub energy: Option<f64>,

    /// 附着的受力 (eV/Å)
    pub forces: Option<Vec<[f64; 3]>>,
}

impl Structure {
    pub fn new(symbols: Vec<String>, positions: Vec<[f64; 3]>) -> Self {
        Structure {
            symbols,
            positions,
            cell: None,
            pbc: [false; 3],
            momenta: None,
            energy: None,
            forces: None,
        }
    }

    /// 原子数
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// 各原子质量 (amu)
    pub fn masses(&self) -> Result<Vec<f64>> {
        self.symbols
            .iter()
            .map(|s| units::atomic_mass(s))
            .collect()
    }

    /// 出现过的元素符号（按首次出现顺序去重）
    pub fn species(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for s in &self.symbols {
            if !seen.contains(s) {
                seen.push(s.clone());
            }
        }
        seen
    }

    /// 动能 (eV)；无动量时为 0
    pub fn kinetic_energy(&self) -> Result<f64> {
        let momenta = match &self.momenta {
            Some(p) => p,
            None => return Ok(0.0),
        };
        let masses = self.masses()?;

        let mut ke = 0.0;
        for (p, m) in momenta.iter().zip(masses.iter()) {
            let p_sq = p[0] * p[0] + p[1] * p[1] + p[2] * p[2];
            ke += 0.5 * p_sq / m;
        }
        Ok(ke)
    }

    /// 瞬时温度 (K)，按 3N 自由度；无原子或无动量时为 0
    pub fn temperature(&self) -> Result<f64> {
        if self.is_empty() || self.momenta.is_none() {
            return Ok(0.0);
        }
        let ke = self.kinetic_energy()?;
        Ok(2.0 * ke / (3.0 * self.len() as f64 * units::KB))
    }

    /// 丢弃附着的计算结果与动量（写出干净的输入结构时使用）
    pub fn clear_results(&mut self) {
        self.energy = None;
        self.forces = None;
        self.momenta = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Structure {
        Structure::new(
            vec!["O".to_string(), "H".to_string(), "H".to_string()],
            vec![
                [0.0, 0.0, 0.119262],
                [0.0, 0.763239, -0.477047],
                [0.0, -0.763239, -0.477047],
            ],
        )
    }

    #[test]
    fn test_lattice_volume_cubic() {
        let lattice = Lattice::from_vectors([[5.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 5.0]]);
        // 5^3 = 125
        assert!((lattice.volume().abs() - 125.0).abs() < 1e-9);
    }

    #[test]
    fn test_lattice_lengths() {
        let lattice = Lattice::from_vectors([[3.0, 4.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 1.5]]);
        let (a, b, c) = lattice.lengths();
        assert!((a - 5.0).abs() < 1e-12);
        assert!((b - 2.0).abs() < 1e-12);
        assert!((c - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_species_dedup() {
        let s = water();
        assert_eq!(s.species(), vec!["O".to_string(), "H".to_string()]);
    }

    #[test]
    fn test_kinetic_energy_no_momenta() {
        let s = water();
        assert_eq!(s.kinetic_energy().unwrap(), 0.0);
        assert_eq!(s.temperature().unwrap(), 0.0);
    }

    #[test]
    fn test_temperature_single_atom() {
        let mut s = Structure::new(vec!["Ar".to_string()], vec![[0.0, 0.0, 0.0]]);
        let m = 39.948;
        // 设动量使 KE = 1.5 kB * 300
        let ke_target = 1.5 * crate::utils::units::KB * 300.0;
        let p = (2.0 * m * ke_target / 3.0).sqrt();
        s.momenta = Some(vec![[p, p, p]]);

        assert!((s.temperature().unwrap() - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_clear_results() {
        let mut s = water();
        s.energy = Some(-14.2);
        s.forces = Some(vec![[0.0; 3]; 3]);
        s.momenta = Some(vec![[0.0; 3]; 3]);
        s.clear_results();
        assert!(s.energy.is_none());
        assert!(s.forces.is_none());
        assert!(s.momenta.is_none());
    }

    #[test]
    fn test_masses_unknown_element() {
        let s = Structure::new(vec!["Qq".to_string()], vec![[0.0; 3]]);
        assert!(s.masses().is_err());
    }
}
