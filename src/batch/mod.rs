//! # 批量计算模块
//!
//! 对多帧结构并行求值。
//!
//! ## 依赖关系
//! - 被 `commands/evaluate.rs` 调用
//! - 使用 `rayon` 并行计算
//! - 子模块: runner

pub mod runner;

pub use runner::EvalRunner;
