//! # 不确定度量化模块
//!
//! 最后一层预测刚度 (LLPR) 近似：由读出层特征的二阶矩估计
//! 预测置信度。
//!
//! ## 依赖关系
//! - 被 `commands/analyze/uq.rs` 使用
//! - 使用 `potential/`, `models/dataset.rs`
//! - 子模块: llpr

pub mod llpr;

pub use llpr::LlprUncertaintyModel;
