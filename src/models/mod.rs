//! # 数据模型模块
//!
//! 定义原子结构与数据集的统一表示。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `potential/`, `dynamics/`, `uq/` 使用
//! - 子模块: structure, dataset, molecules

pub mod dataset;
pub mod molecules;
pub mod structure;

pub use dataset::Dataset;
pub use structure::{Lattice, Structure};
