//! # Potkit - 机器学习原子间势统一工作流工具箱
//!
//! 将分散的势函数工作流脚本用 Rust 重构，统一成单一可执行文件。
//!
//! ## 子命令
//! - `generate` - Langevin MD 采样训练数据
//! - `train`    - 岭回归拟合读出层并写出数据划分
//! - `evaluate` - 批量评估模型预测
//! - `optimize` - LBFGS 结构弛豫
//! - `analyze`  - 分析功能
//!   - `parity` - 预测-参考奇偶图
//!   - `thermo` - 热力学轨迹图
//!   - `uq`     - LLPR 不确定度量化
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (轨迹/索引/热力学文件)
//!   │     ├── models/    (结构与数据集)
//!   │     ├── potential/ (描述符、模型、计算器)
//!   │     ├── dynamics/  (Langevin MD 与 LBFGS)
//!   │     └── uq/        (LLPR 不确定度)
//!   ├── batch/      (并行帧评估)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod dynamics;
mod error;
mod models;
mod parsers;
mod potential;
mod uq;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
