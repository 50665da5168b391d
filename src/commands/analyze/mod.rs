//! # analyze 子命令分发
//!
//! ## 依赖关系
//! - 被 `commands/mod.rs` 调用
//! - 子模块: parity, thermo, uq

pub mod parity;
pub mod thermo;
pub mod uq;

use crate::cli::analyze::{AnalyzeArgs, AnalyzeCommands};
use crate::error::Result;

/// 分发 analyze 子命令
pub fn execute(args: AnalyzeArgs) -> Result<()> {
    match args.command {
        AnalyzeCommands::Parity(args) => parity::execute(args),
        AnalyzeCommands::Thermo(args) => thermo::execute(args),
        AnalyzeCommands::Uq(args) => uq::execute(args),
    }
}
