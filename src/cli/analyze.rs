//! # analyze 子命令 CLI 定义
//!
//! 分析功能统一入口，包含多个子命令：
//! - `parity`: 目标能量 vs 预测能量奇偶图
//! - `thermo`: 热力学轨迹四联图
//! - `uq`: LLPR 不确定度量化
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/analyze/` 相应模块

use clap::{Args, Subcommand};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────
// Analyze 主命令
// ─────────────────────────────────────────────────────────────

/// analyze 主命令参数
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(subcommand)]
    pub command: AnalyzeCommands,
}

/// analyze 子命令
#[derive(Subcommand, Debug)]
pub enum AnalyzeCommands {
    /// Parity plot of target vs predicted energies per data subset
    Parity(ParityArgs),

    /// Plot the thermodynamic trace of an MD run
    Thermo(ThermoArgs),

    /// LLPR uncertainty quantification against true errors
    Uq(UqArgs),
}

// ─────────────────────────────────────────────────────────────
// Parity 子命令
// ─────────────────────────────────────────────────────────────

/// parity 子命令参数
#[derive(Args, Debug)]
pub struct ParityArgs {
    /// Trajectory with reference energies (extxyz)
    #[arg(long)]
    pub targets: PathBuf,

    /// Trajectory with predicted energies (extxyz)
    #[arg(long)]
    pub predictions: PathBuf,

    /// Directory with training.txt/validation.txt/test.txt
    /// (default: latest run under --run-root)
    #[arg(long)]
    pub indices_dir: Option<PathBuf>,

    /// Root directory searched for the latest run indices
    #[arg(long, default_value = "outputs")]
    pub run_root: PathBuf,

    /// Output figure (PNG)
    #[arg(short, long, default_value = "parity_plot.png")]
    pub output: PathBuf,

    /// Figure width in pixels
    #[arg(long, default_value_t = 1000)]
    pub width: u32,

    /// Figure height in pixels
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Optional CSV export of per-frame energies and errors
    #[arg(long)]
    pub output_csv: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────
// Thermo 子命令
// ─────────────────────────────────────────────────────────────

/// thermo 子命令参数
#[derive(Args, Debug)]
pub struct ThermoArgs {
    /// Thermodynamic trace file written by `generate`
    #[arg(default_value = "thermo.out")]
    pub input: PathBuf,

    /// Output figure (PNG)
    #[arg(short, long, default_value = "thermo.png")]
    pub output: PathBuf,

    /// Figure width in pixels
    #[arg(long, default_value_t = 2000)]
    pub width: u32,

    /// Figure height in pixels
    #[arg(long, default_value_t = 500)]
    pub height: u32,
}

// ─────────────────────────────────────────────────────────────
// UQ 子命令
// ─────────────────────────────────────────────────────────────

/// uq 子命令参数
#[derive(Args, Debug)]
pub struct UqArgs {
    /// Path to the potential model file (TOML)
    #[arg(long, alias = "model_path", default_value = "model.toml")]
    pub model_path: PathBuf,

    /// Reference trajectory with ground-truth energies (extxyz)
    #[arg(long)]
    pub dataset: PathBuf,

    /// Output figure (PNG)
    #[arg(long, alias = "output_figure", default_value = "uq_vs_error.png")]
    pub output_figure: PathBuf,

    /// Regularization constant added to the covariance diagonal
    #[arg(long, default_value_t = 1e-12)]
    pub regularizer: f64,

    /// Batch size for covariance accumulation and calibration
    #[arg(long, default_value_t = 10)]
    pub batch_size: usize,

    /// Figure width in pixels
    #[arg(long, default_value_t = 900)]
    pub width: u32,

    /// Figure height in pixels
    #[arg(long, default_value_t = 700)]
    pub height: u32,

    /// Optional CSV export of errors and uncertainties
    #[arg(long)]
    pub output_csv: Option<PathBuf>,
}
