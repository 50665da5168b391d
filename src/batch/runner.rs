//! # 并行帧评估器
//!
//! 用 rayon 线程池对一批结构并行求能量与受力，结果保持输入顺序。
//! 任一帧失败即整体失败并返回该帧的错误。
//!
//! ## 依赖关系
//! - 被 `commands/evaluate.rs`, `commands/analyze/uq.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::error::{PotkitError, Result};
use crate::models::Structure;
use crate::potential::{Calculator, Evaluation, ModelCalculator};
use crate::utils::progress;

use rayon::prelude::*;

/// 并行帧评估器
pub struct EvalRunner {
    /// 并行作业数
    jobs: usize,
}

impl EvalRunner {
    /// 创建评估器；jobs 为 0 时使用全部 CPU 核心
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    /// 并行求值，结果按帧顺序返回
    pub fn run(
        &self,
        frames: &[Structure],
        calculator: &ModelCalculator,
        message: &str,
    ) -> Result<Vec<Evaluation>> {
        let pb = progress::create_progress_bar(frames.len() as u64, message);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| PotkitError::Other(format!("thread pool: {}", e)))?;

        let results: Vec<Result<Evaluation>> = pool.install(|| {
            frames
                .par_iter()
                .map(|frame| {
                    let result = calculator.evaluate(frame);
                    pb.inc(1);
                    result
                })
                .collect()
        });

        pb.finish_and_clear();

        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::potential::descriptor::RadialBasis;
    use crate::potential::model::{ModelInfo, PotentialModel};
    use std::collections::BTreeMap;

    fn toy_calculator() -> ModelCalculator {
        let mut weights = BTreeMap::new();
        weights.insert("H".to_string(), vec![0.2, -0.1]);
        let mut intercepts = BTreeMap::new();
        intercepts.insert("H".to_string(), -0.5);

        ModelCalculator::new(PotentialModel {
            info: ModelInfo {
                name: "toy".to_string(),
                energy_unit: "eV".to_string(),
                length_unit: "angstrom".to_string(),
                cutoff: 4.0,
                species: vec!["H".to_string()],
            },
            descriptor: RadialBasis {
                n_radial: 2,
                sigma: 0.5,
            },
            weights,
            intercepts,
        })
    }

    fn dimers(n: usize) -> Vec<Structure> {
        (0..n)
            .map(|i| {
                Structure::new(
                    vec!["H".to_string(), "H".to_string()],
                    vec![[0.0, 0.0, 0.0], [0.7 + 0.1 * i as f64, 0.0, 0.0]],
                )
            })
            .collect()
    }

    #[test]
    fn test_results_keep_frame_order() {
        let calc = toy_calculator();
        let frames = dimers(12);
        let runner = EvalRunner::new(4);

        let parallel = runner.run(&frames, &calc, "test").unwrap();
        assert_eq!(parallel.len(), 12);

        for (frame, evaluation) in frames.iter().zip(parallel.iter()) {
            let serial = calc.evaluate(frame).unwrap();
            assert!((serial.energy - evaluation.energy).abs() < 1e-12);
        }
    }

    #[test]
    fn test_failing_frame_propagates_error() {
        let calc = toy_calculator();
        let mut frames = dimers(3);
        frames[1].symbols[0] = "Xe".to_string();

        let runner = EvalRunner::new(2);
        assert!(runner.run(&frames, &calc, "test").is_err());
    }
}
