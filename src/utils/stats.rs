//! # 统计工具
//!
//! train 与 analyze parity 共用的误差指标。
//!
//! ## 依赖关系
//! - 被 `commands/train.rs`, `commands/analyze/parity.rs` 使用
//! - 无外部模块依赖

/// 均值；空切片返回 0
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// 均方根误差
pub fn rmse(targets: &[f64], predictions: &[f64]) -> f64 {
    if targets.is_empty() {
        return 0.0;
    }
    let sq_sum: f64 = targets
        .iter()
        .zip(predictions.iter())
        .map(|(t, p)| (t - p) * (t - p))
        .sum();
    (sq_sum / targets.len() as f64).sqrt()
}

/// 平均绝对误差
pub fn mae(targets: &[f64], predictions: &[f64]) -> f64 {
    if targets.is_empty() {
        return 0.0;
    }
    let abs_sum: f64 = targets
        .iter()
        .zip(predictions.iter())
        .map(|(t, p)| (t - p).abs())
        .sum();
    abs_sum / targets.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert!((mean(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-12);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_rmse_mae() {
        let t = [1.0, 2.0, 3.0];
        let p = [1.0, 3.0, 1.0];
        // 误差: 0, -1, 2
        assert!((rmse(&t, &p) - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((mae(&t, &p) - 1.0).abs() < 1e-12);
    }
}
