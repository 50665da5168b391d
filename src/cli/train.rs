//! # train 子命令 CLI 定义
//!
//! 在参考轨迹上岭回归拟合读出层，写出模型文件与
//! 训练/验证/测试索引。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/train.rs`

use clap::Args;
use std::path::PathBuf;

/// train 子命令参数
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Reference trajectory with attached energies (extxyz)
    #[arg(long)]
    pub dataset: PathBuf,

    /// Output model file (TOML)
    #[arg(long, default_value = "model.toml")]
    pub output_model: PathBuf,

    /// Model name stored in the metadata
    #[arg(long, default_value = "potkit-model")]
    pub name: String,

    /// Descriptor cutoff radius in Angstrom
    #[arg(long, default_value_t = 5.0)]
    pub cutoff: f64,

    /// Number of radial basis functions
    #[arg(long, default_value_t = 8)]
    pub n_radial: usize,

    /// Gaussian width of the radial basis in Angstrom
    #[arg(long, default_value_t = 0.5)]
    pub sigma: f64,

    /// Ridge regularizer for the normal equations
    #[arg(long, default_value_t = 1e-8)]
    pub ridge: f64,

    /// Fraction of frames used for training
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,

    /// Fraction of frames used for validation
    #[arg(long, default_value_t = 0.1)]
    pub validation_fraction: f64,

    /// Root directory for run outputs (indices land under <root>/run-<ts>/indices/)
    #[arg(long, default_value = "outputs")]
    pub run_root: PathBuf,

    /// RNG seed for the dataset split
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
