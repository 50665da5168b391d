//! # 机器学习势模块
//!
//! 实现描述符 + 线性读出层形式的机器学习原子间势：
//! 模型文件的加载/保存、近邻表、能量/受力计算器与读出层拟合。
//!
//! ## 依赖关系
//! - 被 `commands/`, `dynamics/`, `uq/` 使用
//! - 使用 `models/structure.rs`
//! - 子模块: model, descriptor, neighbors, calculator, fit

pub mod calculator;
pub mod descriptor;
pub mod fit;
pub mod model;
pub mod neighbors;

pub use calculator::{Calculator, Evaluation, ModelCalculator};
pub use model::PotentialModel;
pub use neighbors::NeighborList;
