//! # 热力学轨迹文件解析器
//!
//! MD 过程记录的列式数值表：时间 (fs)、温度 (K)、势能 (eV)、
//! 动能 (eV)、总能 (eV)。空白分隔，`#` 开头为注释行。
//!
//! ## 依赖关系
//! - 被 `commands/generate.rs`, `commands/analyze/thermo.rs` 使用

use crate::error::{PotkitError, Result};
use std::fs;
use std::path::Path;

/// 热力学轨迹中的一行记录
#[derive(Debug, Clone, Copy)]
pub struct ThermoRow {
    /// 模拟时间 (fs)
    pub time: f64,
    /// 瞬时温度 (K)
    pub temperature: f64,
    /// 势能 (eV)
    pub potential_energy: f64,
    /// 动能 (eV)
    pub kinetic_energy: f64,
    /// 总能 (eV)
    pub total_energy: f64,
}

/// 读取热力学轨迹文件
pub fn read_thermo_file(path: &Path) -> Result<Vec<ThermoRow>> {
    let content = fs::read_to_string(path).map_err(|e| PotkitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_thermo_content(&content, &path.display().to_string())
}

/// 从字符串内容解析热力学轨迹
pub fn parse_thermo_content(content: &str, source: &str) -> Result<Vec<ThermoRow>> {
    let mut rows = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let values: Vec<f64> = line
            .split_whitespace()
            .map(|t| t.parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| PotkitError::ParseError {
                format: "thermo".to_string(),
                path: source.to_string(),
                reason: format!("line {}: invalid number", line_no + 1),
            })?;

        if values.len() < 5 {
            return Err(PotkitError::ParseError {
                format: "thermo".to_string(),
                path: source.to_string(),
                reason: format!("line {}: expected 5 columns, got {}", line_no + 1, values.len()),
            });
        }

        rows.push(ThermoRow {
            time: values[0],
            temperature: values[1],
            potential_energy: values[2],
            kinetic_energy: values[3],
            total_energy: values[4],
        });
    }

    Ok(rows)
}

/// 写出热力学轨迹文件
pub fn write_thermo_file(path: &Path, rows: &[ThermoRow]) -> Result<()> {
    fs::write(path, to_thermo_string(rows)).map_err(|e| PotkitError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 将记录转换为表格文本
pub fn to_thermo_string(rows: &[ThermoRow]) -> String {
    let mut result = String::from("# time_fs  temperature_K  epot_eV  ekin_eV  etot_eV\n");
    for row in rows {
        result.push_str(&format!(
            "{:14.4} {:14.4} {:16.8} {:16.8} {:16.8}\n",
            row.time, row.temperature, row.potential_energy, row.kinetic_energy, row.total_energy
        ));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_table() {
        let content = "# header\n0.0 300.0 -14.2 0.05 -14.15\n0.5 290.0 -14.3 0.04 -14.26\n";
        let rows = parse_thermo_content(content, "test").unwrap();
        assert_eq!(rows.len(), 2);
        assert!((rows[1].temperature - 290.0).abs() < 1e-12);
        assert!((rows[0].total_energy - (-14.15)).abs() < 1e-12);
    }

    #[test]
    fn test_parse_rejects_short_rows() {
        assert!(parse_thermo_content("0.0 300.0 -14.2\n", "test").is_err());
    }

    #[test]
    fn test_parse_rejects_bad_number() {
        assert!(parse_thermo_content("0.0 abc -14.2 0.05 -14.15\n", "test").is_err());
    }

    #[test]
    fn test_round_trip() {
        let rows = vec![
            ThermoRow {
                time: 0.0,
                temperature: 300.0,
                potential_energy: -14.2,
                kinetic_energy: 0.05,
                total_energy: -14.15,
            },
            ThermoRow {
                time: 5.0,
                temperature: 312.5,
                potential_energy: -14.25,
                kinetic_energy: 0.08,
                total_energy: -14.17,
            },
        ];

        let text = to_thermo_string(&rows);
        let reparsed = parse_thermo_content(&text, "round_trip").unwrap();
        assert_eq!(reparsed.len(), 2);
        assert!((reparsed[1].temperature - 312.5).abs() < 1e-6);
        assert!((reparsed[1].potential_energy - (-14.25)).abs() < 1e-6);
    }
}
