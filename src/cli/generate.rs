//! # generate 子命令 CLI 定义
//!
//! 用模型计算器驱动 Langevin MD，按间隔采样并写出训练轨迹
//! 与热力学记录。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/generate.rs`

use clap::Args;
use std::path::PathBuf;

/// generate 子命令参数
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Path to the potential model file (TOML)
    #[arg(long)]
    pub model: PathBuf,

    /// Built-in molecule used as the initial structure
    #[arg(long, default_value = "H2O")]
    pub molecule: String,

    /// Initial structure file (extxyz, first frame; overrides --molecule)
    #[arg(long)]
    pub initial: Option<PathBuf>,

    /// Output trajectory file (extxyz)
    #[arg(short, long, default_value = "trajectory.xyz")]
    pub output: PathBuf,

    /// Number of MD steps
    #[arg(long, default_value_t = 10000)]
    pub steps: usize,

    /// Timestep in fs
    #[arg(long, default_value_t = 0.5)]
    pub timestep: f64,

    /// Target temperature in K
    #[arg(long, default_value_t = 300.0)]
    pub temperature: f64,

    /// Friction coefficient in 1/fs
    #[arg(long, default_value_t = 0.1)]
    pub friction: f64,

    /// Snapshot sampling interval in steps
    #[arg(long, default_value_t = 1000)]
    pub sample_interval: usize,

    /// Thermodynamic trace output file
    #[arg(long, default_value = "thermo.out")]
    pub thermo_output: PathBuf,

    /// Thermodynamic trace recording interval in steps
    #[arg(long, default_value_t = 10)]
    pub thermo_interval: usize,

    /// RNG seed for velocity initialization and the thermostat
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
