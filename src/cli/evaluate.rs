//! # evaluate 子命令 CLI 定义
//!
//! 单文件模式对轨迹逐帧并行评估；目录模式按 glob 模式批量处理。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/evaluate.rs`

use clap::Args;
use std::path::PathBuf;

/// evaluate 子命令参数
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Input: trajectory file or directory containing trajectory files
    pub input: PathBuf,

    /// Path to the potential model file (TOML)
    #[arg(long)]
    pub model: PathBuf,

    /// Output: trajectory file (single mode) or directory (batch mode)
    #[arg(short, long, default_value = "output.xyz")]
    pub output: PathBuf,

    /// Glob pattern for input files (batch mode)
    #[arg(long, default_value = "*.xyz")]
    pub pattern: String,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Optional CSV export of predicted energies
    #[arg(long)]
    pub output_csv: Option<PathBuf>,

    /// Overwrite existing output files (batch mode)
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
