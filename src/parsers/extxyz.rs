//! # 扩展 XYZ 格式解析器
//!
//! 解析与写出多帧扩展 XYZ 轨迹文件。
//!
//! ## 格式说明
//! ```text
//! 3                                        # 原子数
//! Lattice="..." Properties=species:S:1:pos:R:3 energy=-14.2 pbc="F F F"
//! O   0.00000000   0.00000000   0.11926200
//! H   0.00000000   0.76323900  -0.47704700
//! H   0.00000000  -0.76323900  -0.47704700
//! ```
//! 注释行为空白分隔的 key=value 对，value 可用双引号包裹；
//! `Properties` 描述每行原子数据的列布局，未知列会被跳过。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/structure.rs`

use crate::error::{PotkitError, Result};
use crate::models::{Lattice, Structure};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 读取多帧扩展 XYZ 文件
pub fn read_frames(path: &Path) -> Result<Vec<Structure>> {
    let content = fs::read_to_string(path).map_err(|e| PotkitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_extxyz_content(&content, &path.display().to_string())
}

/// 从字符串内容解析多帧扩展 XYZ
pub fn parse_extxyz_content(content: &str, source: &str) -> Result<Vec<Structure>> {
    let lines: Vec<&str> = content.lines().collect();
    let mut frames = Vec::new();
    let mut cursor = 0;

    // 跳过文件尾部空行
    while cursor < lines.len() {
        if lines[cursor].trim().is_empty() {
            cursor += 1;
            continue;
        }

        let frame_idx = frames.len();
        let n_atoms: usize = lines[cursor].trim().parse().map_err(|_| parse_error(
            source,
            format!("frame {}: invalid atom count '{}'", frame_idx, lines[cursor].trim()),
        ))?;

        if cursor + 2 + n_atoms > lines.len() {
            return Err(parse_error(
                source,
                format!("frame {}: truncated ({} atom lines expected)", frame_idx, n_atoms),
            ));
        }

        let comment = lines[cursor + 1];
        let atom_lines = &lines[cursor + 2..cursor + 2 + n_atoms];

        frames.push(parse_frame(comment, atom_lines, source, frame_idx)?);
        cursor += 2 + n_atoms;
    }

    Ok(frames)
}

/// Properties 列描述
#[derive(Debug, Clone)]
struct Column {
    name: String,
    width: usize,
}

fn parse_frame(
    comment: &str,
    atom_lines: &[&str],
    source: &str,
    frame_idx: usize,
) -> Result<Structure> {
    let fields = parse_key_values(comment);

    let columns = match fields.get("Properties") {
        Some(layout) => parse_properties(layout, source, frame_idx)?,
        None => vec![
            Column { name: "species".to_string(), width: 1 },
            Column { name: "pos".to_string(), width: 3 },
        ],
    };

    let mut symbols = Vec::with_capacity(atom_lines.len());
    let mut positions = Vec::with_capacity(atom_lines.len());
    let mut forces: Vec<[f64; 3]> = Vec::new();
    let mut momenta: Vec<[f64; 3]> = Vec::new();
    let has_forces = columns.iter().any(|c| c.name == "forces");
    let has_momenta = columns.iter().any(|c| c.name == "momenta");

    let expected_width: usize = columns.iter().map(|c| c.width).sum();

    for (i, line) in atom_lines.iter().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < expected_width {
            return Err(parse_error(
                source,
                format!(
                    "frame {}, atom {}: expected {} columns, got {}",
                    frame_idx,
                    i,
                    expected_width,
                    tokens.len()
                ),
            ));
        }

        let mut offset = 0;
        for col in &columns {
            let slice = &tokens[offset..offset + col.width];
            match col.name.as_str() {
                "species" => symbols.push(slice[0].to_string()),
                "pos" => positions.push(parse_vec3(slice, source, frame_idx, i)?),
                "forces" => forces.push(parse_vec3(slice, source, frame_idx, i)?),
                "momenta" => momenta.push(parse_vec3(slice, source, frame_idx, i)?),
                // 未知属性列：跳过
                _ => {}
            }
            offset += col.width;
        }
    }

    let mut structure = Structure::new(symbols, positions);
    if has_forces {
        structure.forces = Some(forces);
    }
    if has_momenta {
        structure.momenta = Some(momenta);
    }

    if let Some(lattice) = fields.get("Lattice") {
        let values: Vec<f64> = lattice
            .split_whitespace()
            .map(|t| t.parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| parse_error(source, format!("frame {}: bad Lattice value", frame_idx)))?;
        if values.len() != 9 {
            return Err(parse_error(
                source,
                format!("frame {}: Lattice needs 9 values, got {}", frame_idx, values.len()),
            ));
        }
        structure.cell = Some(Lattice::from_vectors([
            [values[0], values[1], values[2]],
            [values[3], values[4], values[5]],
            [values[6], values[7], values[8]],
        ]));
    }

    if let Some(pbc) = fields.get("pbc") {
        let flags: Vec<bool> = pbc
            .split_whitespace()
            .map(|t| matches!(t, "T" | "t" | "True" | "true" | "1"))
            .collect();
        if flags.len() == 3 {
            structure.pbc = [flags[0], flags[1], flags[2]];
        }
    } else if structure.cell.is_some() {
        structure.pbc = [true; 3];
    }

    if let Some(energy) = fields.get("energy") {
        let value = energy
            .parse::<f64>()
            .map_err(|_| parse_error(source, format!("frame {}: bad energy value", frame_idx)))?;
        structure.energy = Some(value);
    }

    Ok(structure)
}

/// 解析注释行的 key=value 对（value 可带双引号）
fn parse_key_values(comment: &str) -> HashMap<String, String> {
    let re = Regex::new(r#"([A-Za-z_][A-Za-z0-9_:]*)=(?:"([^"]*)"|(\S+))"#).unwrap();
    let mut fields = HashMap::new();

    for cap in re.captures_iter(comment) {
        let key = cap[1].to_string();
        let value = cap
            .get(2)
            .or_else(|| cap.get(3))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        fields.insert(key, value);
    }

    fields
}

/// 解析 Properties 列描述，如 species:S:1:pos:R:3:forces:R:3
fn parse_properties(layout: &str, source: &str, frame_idx: usize) -> Result<Vec<Column>> {
    let tokens: Vec<&str> = layout.split(':').collect();
    if tokens.len() % 3 != 0 || tokens.is_empty() {
        return Err(parse_error(
            source,
            format!("frame {}: malformed Properties '{}'", frame_idx, layout),
        ));
    }

    let mut columns = Vec::new();
    for chunk in tokens.chunks(3) {
        let width: usize = chunk[2].parse().map_err(|_| {
            parse_error(
                source,
                format!("frame {}: malformed Properties '{}'", frame_idx, layout),
            )
        })?;
        columns.push(Column {
            name: chunk[0].to_string(),
            width,
        });
    }
    Ok(columns)
}

fn parse_vec3(tokens: &[&str], source: &str, frame_idx: usize, atom: usize) -> Result<[f64; 3]> {
    let mut out = [0.0; 3];
    for (k, token) in tokens.iter().take(3).enumerate() {
        out[k] = token.parse::<f64>().map_err(|_| {
            parse_error(
                source,
                format!("frame {}, atom {}: bad float '{}'", frame_idx, atom, token),
            )
        })?;
    }
    Ok(out)
}

fn parse_error(source: &str, reason: String) -> PotkitError {
    PotkitError::ParseError {
        format: "extxyz".to_string(),
        path: source.to_string(),
        reason,
    }
}

/// 写出多帧扩展 XYZ 文件
pub fn write_frames(path: &Path, frames: &[Structure]) -> Result<()> {
    let mut content = String::new();
    for frame in frames {
        content.push_str(&to_extxyz_string(frame));
    }

    fs::write(path, content).map_err(|e| PotkitError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 将单帧结构转换为扩展 XYZ 字符串
pub fn to_extxyz_string(structure: &Structure) -> String {
    let mut result = String::new();
    result.push_str(&format!("{}\n", structure.len()));

    // 注释行
    let mut comment = String::new();
    if let Some(cell) = &structure.cell {
        let m = cell.matrix;
        comment.push_str(&format!(
            "Lattice=\"{} {} {} {} {} {} {} {} {}\" ",
            m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2]
        ));
    }

    let mut properties = "species:S:1:pos:R:3".to_string();
    if structure.forces.is_some() {
        properties.push_str(":forces:R:3");
    }
    if structure.momenta.is_some() {
        properties.push_str(":momenta:R:3");
    }
    comment.push_str(&format!("Properties={}", properties));

    if let Some(energy) = structure.energy {
        comment.push_str(&format!(" energy={:.10}", energy));
    }

    let pbc: Vec<&str> = structure
        .pbc
        .iter()
        .map(|&p| if p { "T" } else { "F" })
        .collect();
    comment.push_str(&format!(" pbc=\"{}\"", pbc.join(" ")));

    result.push_str(&comment);
    result.push('\n');

    // 原子行
    for i in 0..structure.len() {
        let p = structure.positions[i];
        result.push_str(&format!(
            "{:<3} {:16.8} {:16.8} {:16.8}",
            structure.symbols[i], p[0], p[1], p[2]
        ));
        if let Some(forces) = &structure.forces {
            let f = forces[i];
            result.push_str(&format!(" {:16.8} {:16.8} {:16.8}", f[0], f[1], f[2]));
        }
        if let Some(momenta) = &structure.momenta {
            let m = momenta[i];
            result.push_str(&format!(" {:16.8} {:16.8} {:16.8}", m[0], m[1], m[2]));
        }
        result.push('\n');
    }

    result
}
