//! # 单位常数模块
//!
//! 采用原子模拟惯用单位制：长度 Å、能量 eV、质量 amu。
//! 由此导出的内部时间单位为 Å·√(amu/eV) ≈ 10.1805 fs。
//!
//! ## 依赖关系
//! - 被 `dynamics/`, `models/` 使用
//! - 无外部模块依赖

use crate::error::{PotkitError, Result};

/// 1 fs 对应的内部时间单位数
pub const FS: f64 = 0.098_226_947_884_640_63;

/// 玻尔兹曼常数 (eV/K)
pub const KB: f64 = 8.617_330_337_217_213e-5;

/// 常见元素的原子质量 (amu)
///
/// 覆盖分子数据集和小分子 MD 示例所需的主族元素。
const ATOMIC_MASSES: &[(&str, f64)] = &[
    ("H", 1.008),
    ("He", 4.002602),
    ("Li", 6.94),
    ("B", 10.81),
    ("C", 12.011),
    ("N", 14.007),
    ("O", 15.999),
    ("F", 18.998403),
    ("Ne", 20.1797),
    ("Na", 22.989769),
    ("Mg", 24.305),
    ("Al", 26.981538),
    ("Si", 28.085),
    ("P", 30.973762),
    ("S", 32.06),
    ("Cl", 35.45),
    ("Ar", 39.948),
    ("K", 39.0983),
    ("Ca", 40.078),
    ("Ti", 47.867),
    ("Fe", 55.845),
    ("Ni", 58.6934),
    ("Cu", 63.546),
    ("Zn", 65.38),
    ("Br", 79.904),
    ("I", 126.90447),
];

/// 查询元素的原子质量 (amu)
pub fn atomic_mass(symbol: &str) -> Result<f64> {
    ATOMIC_MASSES
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, m)| *m)
        .ok_or_else(|| PotkitError::UnknownElement(symbol.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_mass_known() {
        assert!((atomic_mass("O").unwrap() - 15.999).abs() < 1e-9);
        assert!((atomic_mass("H").unwrap() - 1.008).abs() < 1e-9);
    }

    #[test]
    fn test_atomic_mass_unknown() {
        assert!(atomic_mass("Xx").is_err());
    }

    #[test]
    fn test_internal_time_unit() {
        // 1 内部时间单位 ≈ 10.1805 fs
        assert!((1.0 / FS - 10.1805).abs() < 1e-3);
    }
}
