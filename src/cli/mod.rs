//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `generate`: 用模型驱动 MD 采样训练数据
//! - `train`: 在参考轨迹上拟合读出层
//! - `evaluate`: 批量评估模型预测
//! - `optimize`: LBFGS 结构弛豫
//! - `analyze`: 分析功能（嵌套子命令）
//!   - `parity`: 预测-参考奇偶图
//!   - `thermo`: 热力学轨迹图
//!   - `uq`: LLPR 不确定度量化
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: generate, train, evaluate, optimize, analyze

pub mod analyze;
pub mod evaluate;
pub mod generate;
pub mod optimize;
pub mod train;

use clap::{Parser, Subcommand};

/// Potkit - 机器学习原子间势统一工作流工具箱
#[derive(Parser)]
#[command(name = "potkit")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "A unified machine-learning interatomic potential workflow toolkit", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Generate MD training data with a potential-driven Langevin run
    Generate(generate::GenerateArgs),

    /// Fit the linear readout of a potential on a reference trajectory
    Train(train::TrainArgs),

    /// Evaluate a potential over trajectory frames
    Evaluate(evaluate::EvaluateArgs),

    /// Relax a structure with the LBFGS optimizer
    Optimize(optimize::OptimizeArgs),

    /// Analyze predictions (parity plots, thermo traces, uncertainty)
    Analyze(analyze::AnalyzeArgs),
}
