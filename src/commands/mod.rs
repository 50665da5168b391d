//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `models/`, `potential/`, `dynamics/`, `uq/`, `utils/`
//! - 子模块: generate, train, evaluate, optimize, analyze

pub mod analyze;
pub mod evaluate;
pub mod generate;
pub mod optimize;
pub mod train;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Generate(args) => generate::execute(args),
        Commands::Train(args) => train::execute(args),
        Commands::Evaluate(args) => evaluate::execute(args),
        Commands::Optimize(args) => optimize::execute(args),
        Commands::Analyze(args) => analyze::execute(args),
    }
}
