//! # 数据划分索引文件解析器
//!
//! 解析训练流程写出的 training.txt / validation.txt / test.txt
//! 纯文本整数索引文件，并校验划分的合法性。
//!
//! 兼容 `np.savetxt` 的浮点写法（如 `1.000000000000000000e+00`）。
//!
//! ## 依赖关系
//! - 被 `commands/analyze/parity.rs`, `commands/train.rs` 使用
//! - 使用 `walkdir` 自动发现最新一次运行的索引目录

use crate::error::{PotkitError, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 训练/验证/测试索引划分
#[derive(Debug, Clone)]
pub struct IndexSplit {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
    pub test: Vec<usize>,
}

/// 划分覆盖情况
#[derive(Debug, Clone, Copy)]
pub struct SplitCoverage {
    /// 三个子集的并集是否覆盖了全部目标索引
    pub complete: bool,
    /// 未被任何子集覆盖的索引数
    pub missing: usize,
}

impl IndexSplit {
    /// 从索引目录加载（目录需包含 training.txt / validation.txt / test.txt）
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(IndexSplit {
            train: read_index_file(&dir.join("training.txt"))?,
            validation: read_index_file(&dir.join("validation.txt"))?,
            test: read_index_file(&dir.join("test.txt"))?,
        })
    }

    /// 将划分写入索引目录
    pub fn write(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(|e| PotkitError::FileWriteError {
            path: dir.display().to_string(),
            source: e,
        })?;

        for (name, indices) in [
            ("training.txt", &self.train),
            ("validation.txt", &self.validation),
            ("test.txt", &self.test),
        ] {
            let path = dir.join(name);
            let content: String = indices.iter().map(|i| format!("{}\n", i)).collect();
            fs::write(&path, content).map_err(|e| PotkitError::FileWriteError {
                path: path.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// 校验划分：子集必须两两不相交且索引在 [0, n_total) 内。
    /// 覆盖不完整不视为错误，通过返回值报告。
    pub fn validate(&self, n_total: usize) -> Result<SplitCoverage> {
        let mut seen: HashSet<usize> = HashSet::new();

        for (name, indices) in [
            ("training", &self.train),
            ("validation", &self.validation),
            ("test", &self.test),
        ] {
            for &idx in indices.iter() {
                if idx >= n_total {
                    return Err(PotkitError::InvalidSplit(format!(
                        "{} index {} out of range (dataset has {} frames)",
                        name, idx, n_total
                    )));
                }
                if !seen.insert(idx) {
                    return Err(PotkitError::InvalidSplit(format!(
                        "index {} appears in more than one subset",
                        idx
                    )));
                }
            }
        }

        let missing = n_total - seen.len();
        Ok(SplitCoverage {
            complete: missing == 0,
            missing,
        })
    }
}

/// 读取单个索引文件
pub fn read_index_file(path: &Path) -> Result<Vec<usize>> {
    let content = fs::read_to_string(path).map_err(|e| PotkitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_indices_content(&content, &path.display().to_string())
}

/// 解析索引文件内容：空白分隔的整数，跳过空行与 # 注释
pub fn parse_indices_content(content: &str, source: &str) -> Result<Vec<usize>> {
    let mut indices = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        for token in line.split_whitespace() {
            indices.push(parse_index_token(token, source)?);
        }
    }

    Ok(indices)
}

fn parse_index_token(token: &str, source: &str) -> Result<usize> {
    if let Ok(value) = token.parse::<usize>() {
        return Ok(value);
    }

    // np.savetxt 默认以科学计数浮点写出整数
    if let Ok(value) = token.parse::<f64>() {
        if value >= 0.0 && value.fract() == 0.0 {
            return Ok(value as usize);
        }
    }

    Err(PotkitError::ParseError {
        format: "indices".to_string(),
        path: source.to_string(),
        reason: format!("invalid index token '{}'", token),
    })
}

/// 在输出根目录下查找最新一次运行的索引目录
///
/// 运行目录按名称字典序比较，train 写出的 `run-<unix时间戳>`
/// 与原始流程的 `<date>/<time>` 布局都满足“字典序最大即最新”。
pub fn find_latest_run_indices(root: &Path) -> Result<PathBuf> {
    if !root.is_dir() {
        return Err(PotkitError::DirectoryNotFound {
            path: root.display().to_string(),
        });
    }

    let mut candidates: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir() && e.file_name() == "indices")
        .map(|e| e.path().to_path_buf())
        .filter(|p| p.join("training.txt").is_file())
        .collect();

    candidates.sort();
    candidates.pop().ok_or_else(|| PotkitError::FileNotFound {
        path: format!("{}/**/indices/training.txt", root.display()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_integers() {
        let indices = parse_indices_content("0\n1\n5\n", "test").unwrap();
        assert_eq!(indices, vec![0, 1, 5]);
    }

    #[test]
    fn test_parse_savetxt_floats() {
        let content = "0.000000000000000000e+00\n7.000000000000000000e+00\n";
        let indices = parse_indices_content(content, "test").unwrap();
        assert_eq!(indices, vec![0, 7]);
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let indices = parse_indices_content("# header\n\n3 4\n", "test").unwrap();
        assert_eq!(indices, vec![3, 4]);
    }

    #[test]
    fn test_parse_rejects_fractional() {
        assert!(parse_indices_content("1.5\n", "test").is_err());
    }

    #[test]
    fn test_validate_disjoint_and_complete() {
        let split = IndexSplit {
            train: vec![0, 1, 2],
            validation: vec![3],
            test: vec![4],
        };
        let coverage = split.validate(5).unwrap();
        assert!(coverage.complete);
        assert_eq!(coverage.missing, 0);
    }

    #[test]
    fn test_validate_overlap_rejected() {
        let split = IndexSplit {
            train: vec![0, 1],
            validation: vec![1],
            test: vec![2],
        };
        assert!(split.validate(3).is_err());
    }

    #[test]
    fn test_validate_out_of_range_rejected() {
        let split = IndexSplit {
            train: vec![0],
            validation: vec![1],
            test: vec![9],
        };
        assert!(split.validate(3).is_err());
    }

    #[test]
    fn test_validate_incomplete_coverage_reported() {
        let split = IndexSplit {
            train: vec![0],
            validation: vec![1],
            test: vec![2],
        };
        let coverage = split.validate(10).unwrap();
        assert!(!coverage.complete);
        assert_eq!(coverage.missing, 7);
    }
}
