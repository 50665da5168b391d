//! # 数据集数据模型
//!
//! 数据集由结构列表与若干命名标量目标组成（如 "energy"）。
//! 构建时校验所有目标向量长度与结构数一致，
//! 并提供固定大小、不打乱的分批迭代供 UQ 累积使用。
//!
//! ## 依赖关系
//! - 被 `uq/llpr.rs`, `commands/analyze/uq.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{PotkitError, Result};
use crate::models::Structure;
use std::collections::BTreeMap;

/// 结构 + 命名目标的数据集
#[derive(Debug, Clone)]
pub struct Dataset {
    systems: Vec<Structure>,
    targets: BTreeMap<String, Vec<f64>>,
}

/// 一个批次：结构切片与对应的目标切片
pub struct Batch<'a> {
    pub systems: &'a [Structure],
    pub targets: BTreeMap<&'a str, &'a [f64]>,
}

impl Dataset {
    /// 从结构列表与目标表构建；校验并行数组长度
    pub fn new(systems: Vec<Structure>, targets: BTreeMap<String, Vec<f64>>) -> Result<Self> {
        for (name, values) in &targets {
            if values.len() != systems.len() {
                return Err(PotkitError::LengthMismatch {
                    what: format!("target '{}'", name),
                    expected: systems.len(),
                    actual: values.len(),
                });
            }
        }
        Ok(Dataset { systems, targets })
    }

    /// 从带附着能量的帧构建单目标数据集
    ///
    /// 任一帧缺失能量即报错，并指明帧号。
    pub fn from_frames(frames: Vec<Structure>, target_name: &str) -> Result<Self> {
        let mut energies = Vec::with_capacity(frames.len());
        for (i, frame) in frames.iter().enumerate() {
            match frame.energy {
                Some(e) => energies.push(e),
                None => return Err(PotkitError::MissingEnergy { frame: i }),
            }
        }

        let mut targets = BTreeMap::new();
        targets.insert(target_name.to_string(), energies);
        Dataset::new(frames, targets)
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn systems(&self) -> &[Structure] {
        &self.systems
    }

    /// 按名称取目标向量
    pub fn target(&self, name: &str) -> Option<&[f64]> {
        self.targets.get(name).map(|v| v.as_slice())
    }

    /// 固定大小分批迭代（不打乱，最后一批可能较小）
    pub fn batches(&self, batch_size: usize) -> impl Iterator<Item = Batch<'_>> {
        let batch_size = batch_size.max(1);
        let n = self.systems.len();
        let n_batches = n.div_ceil(batch_size);

        (0..n_batches).map(move |b| {
            let start = b * batch_size;
            let end = ((b + 1) * batch_size).min(n);
            let targets = self
                .targets
                .iter()
                .map(|(name, values)| (name.as_str(), &values[start..end]))
                .collect();
            Batch {
                systems: &self.systems[start..end],
                targets,
            }
        })
    }
}
