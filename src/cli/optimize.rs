//! # optimize 子命令 CLI 定义
//!
//! 用 LBFGS 将结构弛豫到受力阈值以下。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/optimize.rs`

use clap::Args;
use std::path::PathBuf;

/// optimize 子命令参数
#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// Path to the potential model file (TOML)
    #[arg(long)]
    pub model: PathBuf,

    /// Built-in molecule used as the initial structure
    #[arg(long, default_value = "H2O")]
    pub molecule: String,

    /// Initial structure file (extxyz, first frame; overrides --molecule)
    #[arg(long)]
    pub initial: Option<PathBuf>,

    /// Convergence threshold on the maximum force component (eV/A)
    #[arg(long, default_value_t = 0.01)]
    pub fmax: f64,

    /// Maximum number of optimizer steps
    #[arg(long, default_value_t = 200)]
    pub max_steps: usize,

    /// Maximum displacement of a single atom per step (A)
    #[arg(long, default_value_t = 0.2)]
    pub maxstep: f64,

    /// Output file for the relaxed structure (extxyz)
    #[arg(short, long, default_value = "optimized.xyz")]
    pub output: PathBuf,

    /// Optional trajectory of intermediate structures (extxyz)
    #[arg(long)]
    pub trajectory: Option<PathBuf>,
}
