//! # 分子动力学与结构弛豫模块
//!
//! Langevin 恒温动力学（BAOAB 积分）与 LBFGS 结构弛豫，
//! 均以 `Calculator` 接口驱动。
//!
//! ## 依赖关系
//! - 被 `commands/generate.rs`, `commands/optimize.rs` 使用
//! - 使用 `potential/calculator.rs` 接口
//! - 子模块: langevin, lbfgs

pub mod langevin;
pub mod lbfgs;

pub use langevin::{Langevin, StepInfo};
pub use lbfgs::{Lbfgs, OptimizationResult};
