//! # 解析器模块
//!
//! 提供轨迹、索引与热力学轨迹文件的解析器。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: extxyz, indices, thermo

pub mod extxyz;
pub mod indices;
pub mod thermo;
