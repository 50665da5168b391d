//! # 小分子几何构建
//!
//! 内置一组常见气相小分子的平衡几何，按名称查询构建初始结构，
//! 用作 MD 采样与结构弛豫的起点。
//!
//! 几何取自 G2 数据集的常用值，坐标单位 Å。
//!
//! ## 依赖关系
//! - 被 `commands/generate.rs`, `commands/optimize.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{PotkitError, Result};
use crate::models::Structure;

/// 按名称构建内置分子
pub fn build_molecule(name: &str) -> Result<Structure> {
    let entry: Option<(&[&str], &[[f64; 3]])> = match name {
        "H2O" => Some((
            &["O", "H", "H"],
            &[
                [0.0, 0.0, 0.119262],
                [0.0, 0.763239, -0.477047],
                [0.0, -0.763239, -0.477047],
            ],
        )),
        "H2" => Some((&["H", "H"], &[[0.0, 0.0, 0.368583], [0.0, 0.0, -0.368583]])),
        "N2" => Some((&["N", "N"], &[[0.0, 0.0, 0.56499], [0.0, 0.0, -0.56499]])),
        "CO" => Some((&["C", "O"], &[[0.0, 0.0, -0.646514], [0.0, 0.0, 0.484886]])),
        "CO2" => Some((
            &["C", "O", "O"],
            &[
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 1.178658],
                [0.0, 0.0, -1.178658],
            ],
        )),
        "CH4" => Some((
            &["C", "H", "H", "H", "H"],
            &[
                [0.0, 0.0, 0.0],
                [0.629118, 0.629118, 0.629118],
                [-0.629118, -0.629118, 0.629118],
                [0.629118, -0.629118, -0.629118],
                [-0.629118, 0.629118, -0.629118],
            ],
        )),
        "NH3" => Some((
            &["N", "H", "H", "H"],
            &[
                [0.0, 0.0, 0.116489],
                [0.0, 0.939731, -0.271808],
                [0.813831, -0.469865, -0.271808],
                [-0.813831, -0.469865, -0.271808],
            ],
        )),
        _ => None,
    };

    let (symbols, positions) =
        entry.ok_or_else(|| PotkitError::UnknownMolecule(name.to_string()))?;

    Ok(Structure::new(
        symbols.iter().map(|s| s.to_string()).collect(),
        positions.to_vec(),
    ))
}

/// 已支持的分子名称列表（错误提示用）
pub fn available_molecules() -> &'static [&'static str] {
    &["H2O", "H2", "N2", "CO", "CO2", "CH4", "NH3"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_water() {
        let s = build_molecule("H2O").unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.symbols[0], "O");

        // O-H 键长约 0.96-0.97 Å
        let o = s.positions[0];
        let h = s.positions[1];
        let d = ((o[0] - h[0]).powi(2) + (o[1] - h[1]).powi(2) + (o[2] - h[2]).powi(2)).sqrt();
        assert!(d > 0.90 && d < 1.05, "O-H distance {} out of range", d);
    }

    #[test]
    fn test_build_methane_bond_lengths() {
        let s = build_molecule("CH4").unwrap();
        assert_eq!(s.len(), 5);

        let c = s.positions[0];
        for h in &s.positions[1..] {
            let d =
                ((c[0] - h[0]).powi(2) + (c[1] - h[1]).powi(2) + (c[2] - h[2]).powi(2)).sqrt();
            assert!((d - 1.0896).abs() < 0.01);
        }
    }

    #[test]
    fn test_unknown_molecule() {
        match build_molecule("C60") {
            Err(PotkitError::UnknownMolecule(name)) => assert_eq!(name, "C60"),
            other => panic!("unexpected: {:?}", other.map(|s| s.len())),
        }
    }

    #[test]
    fn test_all_listed_molecules_build() {
        for name in available_molecules() {
            let s = build_molecule(name).unwrap();
            assert!(!s.is_empty());
            assert!(s.masses().is_ok());
        }
    }
}
