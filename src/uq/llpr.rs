//! # LLPR 不确定度模型
//!
//! 把已训练的势模型包装为不确定度估计器：
//! 1. `compute_covariance` 按批累积读出层特征的二阶矩 C = Σ f fᵀ；
//! 2. `compute_inverse_covariance` 加正则项 λI 后用 Cholesky 求逆；
//! 3. `calibrate` 在标定集上求全局尺度 α² = mean(err² / σ²_raw)；
//! 4. `variance` / `uncertainty` 对单个结构给出 α²·fᵀC⁻¹f 及其平方根。
//!
//! 固定正则常数与数据顺序下整个流程是确定性的，重复运行逐位一致。
//!
//! ## 依赖关系
//! - 被 `commands/analyze/uq.rs` 使用
//! - 使用 `potential/{model, descriptor, calculator}.rs`
//! - 使用 `models/dataset.rs` 分批迭代
//! - 使用 `nalgebra` 矩阵运算

use crate::error::{PotkitError, Result};
use crate::models::{Dataset, Structure};
use crate::potential::descriptor::structure_features;
use crate::potential::{Calculator, ModelCalculator, PotentialModel};
use nalgebra::{Cholesky, DMatrix, DVector};

/// LLPR 不确定度模型
pub struct LlprUncertaintyModel {
    calculator: ModelCalculator,
    covariance: DMatrix<f64>,
    inverse_covariance: Option<DMatrix<f64>>,
    /// 标定尺度 α²
    calibration: f64,
    n_accumulated: usize,
}

impl LlprUncertaintyModel {
    /// 包装一个已训练的模型
    pub fn new(model: PotentialModel) -> Self {
        let dim = model.feature_length();
        LlprUncertaintyModel {
            calculator: ModelCalculator::new(model),
            covariance: DMatrix::zeros(dim, dim),
            inverse_covariance: None,
            calibration: 1.0,
            n_accumulated: 0,
        }
    }

    pub fn model(&self) -> &PotentialModel {
        self.calculator.model()
    }

    pub fn calculator(&self) -> &ModelCalculator {
        &self.calculator
    }

    /// 已累积的结构数
    pub fn n_accumulated(&self) -> usize {
        self.n_accumulated
    }

    /// 按批累积特征协方差 C = Σ f fᵀ
    pub fn compute_covariance(&mut self, dataset: &Dataset, batch_size: usize) -> Result<()> {
        for batch in dataset.batches(batch_size) {
            for system in batch.systems {
                let f = self.features(system)?;
                self.covariance += &f * f.transpose();
                self.n_accumulated += 1;
            }
        }
        Ok(())
    }

    /// 加正则项后求逆：(C + λI)⁻¹
    pub fn compute_inverse_covariance(&mut self, regularizer: f64) -> Result<()> {
        let dim = self.covariance.nrows();
        let mut regularized = self.covariance.clone();
        for d in 0..dim {
            regularized[(d, d)] += regularizer;
        }

        let cholesky = Cholesky::new(regularized).ok_or_else(|| {
            PotkitError::LinearAlgebra(format!(
                "covariance is not invertible with regularizer {:e}; increase it",
                regularizer
            ))
        })?;
        self.inverse_covariance = Some(cholesky.inverse());
        Ok(())
    }

    /// 在标定集上求尺度因子 α²，使 mean(err² / σ²) = 1
    pub fn calibrate(&mut self, dataset: &Dataset, batch_size: usize) -> Result<()> {
        self.require_inverse()?;

        let mut ratio_sum = 0.0;
        let mut count = 0usize;
        for batch in dataset.batches(batch_size) {
            let targets = batch.targets.get("energy").copied().ok_or_else(|| {
                PotkitError::InvalidArgument("dataset has no 'energy' target".to_string())
            })?;

            for (system, &target) in batch.systems.iter().zip(targets.iter()) {
                let predicted = self.calculator.potential_energy(system)?;
                let error = target - predicted;
                let raw_variance = self.raw_variance(system)?;
                if raw_variance > 1e-300 {
                    ratio_sum += error * error / raw_variance;
                    count += 1;
                }
            }
        }

        if count == 0 {
            return Err(PotkitError::LinearAlgebra(
                "calibration failed: all raw variances vanish".to_string(),
            ));
        }

        self.calibration = ratio_sum / count as f64;
        Ok(())
    }

    /// 标定后的预测方差 α²·fᵀC⁻¹f
    pub fn variance(&self, structure: &Structure) -> Result<f64> {
        Ok(self.calibration * self.raw_variance(structure)?)
    }

    /// 标定后的预测不确定度（标准差）
    pub fn uncertainty(&self, structure: &Structure) -> Result<f64> {
        Ok(self.variance(structure)?.sqrt())
    }

    /// 数据集中每个结构的不确定度
    pub fn uncertainties(&self, dataset: &Dataset) -> Result<Vec<f64>> {
        dataset
            .systems()
            .iter()
            .map(|s| self.uncertainty(s))
            .collect()
    }

    fn features(&self, structure: &Structure) -> Result<DVector<f64>> {
        let model = self.calculator.model();
        structure_features(
            structure,
            &model.info.species,
            model.info.cutoff,
            &model.descriptor,
        )
    }

    fn raw_variance(&self, structure: &Structure) -> Result<f64> {
        let inverse = self.require_inverse()?;
        let f = self.features(structure)?;
        Ok((inverse * &f).dot(&f))
    }

    fn require_inverse(&self) -> Result<&DMatrix<f64>> {
        self.inverse_covariance.as_ref().ok_or_else(|| {
            PotkitError::InvalidArgument(
                "inverse covariance not computed; call compute_inverse_covariance first"
                    .to_string(),
            )
        })
    }
}
