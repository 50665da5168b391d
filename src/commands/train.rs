//! # train 子命令实现
//!
//! 在参考轨迹上拟合读出层并写出模型与数据划分。
//!
//! ## 功能
//! - 带种子的随机训练/验证/测试划分
//! - 岭回归求解读出层权重
//! - 各子集 RMSE/MAE 终端表格
//! - 索引写入 outputs/run-<时间戳>/indices/ 供奇偶图流程发现
//!
//! ## 依赖关系
//! - 使用 `cli/train.rs` 定义的参数
//! - 使用 `potential/fit.rs`, `parsers/{extxyz,indices}.rs`
//! - 使用 `utils/{output,progress,stats}.rs`

use crate::cli::train::TrainArgs;
use crate::error::{PotkitError, Result};
use crate::parsers::extxyz;
use crate::parsers::indices::IndexSplit;
use crate::potential::descriptor::RadialBasis;
use crate::potential::fit::fit_readout;
use crate::potential::{Calculator, ModelCalculator};
use crate::utils::{output, progress, stats};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::time::{SystemTime, UNIX_EPOCH};
use tabled::{Table, Tabled};

/// 子集指标行
#[derive(Debug, Clone, Tabled)]
struct MetricsRow {
    #[tabled(rename = "Subset")]
    subset: String,
    #[tabled(rename = "Frames")]
    frames: usize,
    #[tabled(rename = "RMSE (eV)")]
    rmse: String,
    #[tabled(rename = "MAE (eV)")]
    mae: String,
}

/// 执行训练
pub fn execute(args: TrainArgs) -> Result<()> {
    output::print_header("Training Potential");

    let frames = extxyz::read_frames(&args.dataset)?;
    if frames.is_empty() {
        return Err(PotkitError::ParseError {
            format: "extxyz".to_string(),
            path: args.dataset.display().to_string(),
            reason: "file contains no frames".to_string(),
        });
    }
    output::print_info(&format!(
        "{} reference frames from '{}'",
        frames.len(),
        args.dataset.display()
    ));

    // 全部帧都要有参考能量，验证/测试指标同样依赖它
    let energies: Vec<f64> = frames
        .iter()
        .enumerate()
        .map(|(i, f)| f.energy.ok_or(PotkitError::MissingEnergy { frame: i }))
        .collect::<Result<_>>()?;

    let split = split_frames(
        frames.len(),
        args.train_fraction,
        args.validation_fraction,
        args.seed,
    )?;
    output::print_info(&format!(
        "Split: {} train / {} validation / {} test (seed {})",
        split.train.len(),
        split.validation.len(),
        split.test.len(),
        args.seed
    ));

    // 写出索引，布局与奇偶图流程的自动发现保持一致
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| PotkitError::Other(format!("system clock: {}", e)))?
        .as_secs();
    let indices_dir = args
        .run_root
        .join(format!("run-{}", timestamp))
        .join("indices");
    split.write(&indices_dir)?;
    output::print_success(&format!("Indices written to '{}'", indices_dir.display()));

    let spinner = progress::create_spinner("Solving ridge regression");
    let basis = RadialBasis {
        n_radial: args.n_radial,
        sigma: args.sigma,
    };
    let model = fit_readout(
        &args.name,
        args.cutoff,
        basis,
        &frames,
        &split.train,
        args.ridge,
    )?;
    spinner.finish_and_clear();

    model.save(&args.output_model)?;
    output::print_success(&format!(
        "Model '{}' ({} species, {} readout weights) saved to '{}'",
        model.info.name,
        model.n_species(),
        model.feature_length(),
        args.output_model.display()
    ));

    // 各子集误差指标
    let calculator = ModelCalculator::new(model);
    let pb = progress::create_progress_bar(frames.len() as u64, "Evaluating");
    let mut predictions = Vec::with_capacity(frames.len());
    for frame in &frames {
        predictions.push(calculator.potential_energy(frame)?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let table_rows: Vec<MetricsRow> = [
        ("train", &split.train),
        ("validation", &split.validation),
        ("test", &split.test),
    ]
    .into_iter()
    .map(|(name, indices)| {
        let targets: Vec<f64> = indices.iter().map(|&i| energies[i]).collect();
        let subset_pred: Vec<f64> = indices.iter().map(|&i| predictions[i]).collect();
        MetricsRow {
            subset: name.to_string(),
            frames: indices.len(),
            rmse: format!("{:.6}", stats::rmse(&targets, &subset_pred)),
            mae: format!("{:.6}", stats::mae(&targets, &subset_pred)),
        }
    })
    .collect();

    println!("{}", Table::new(&table_rows));
    Ok(())
}

/// 带种子的随机划分；保证训练子集非空
fn split_frames(
    n: usize,
    train_fraction: f64,
    validation_fraction: f64,
    seed: u64,
) -> Result<IndexSplit> {
    if !(0.0..=1.0).contains(&train_fraction)
        || !(0.0..=1.0).contains(&validation_fraction)
        || train_fraction + validation_fraction > 1.0
    {
        return Err(PotkitError::InvalidArgument(format!(
            "invalid split fractions: train {} + validation {}",
            train_fraction, validation_fraction
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let n_train = ((n as f64 * train_fraction).round() as usize).clamp(1, n);
    let n_validation = ((n as f64 * validation_fraction).round() as usize).min(n - n_train);

    let mut train: Vec<usize> = order[..n_train].to_vec();
    let mut validation: Vec<usize> = order[n_train..n_train + n_validation].to_vec();
    let mut test: Vec<usize> = order[n_train + n_validation..].to_vec();
    train.sort_unstable();
    validation.sort_unstable();
    test.sort_unstable();

    Ok(IndexSplit {
        train,
        validation,
        test,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_covers_all_frames() {
        let split = split_frames(100, 0.8, 0.1, 42).unwrap();
        assert_eq!(split.train.len(), 80);
        assert_eq!(split.validation.len(), 10);
        assert_eq!(split.test.len(), 10);

        let coverage = split.validate(100).unwrap();
        assert!(coverage.complete);
    }

    #[test]
    fn test_split_is_seeded() {
        let a = split_frames(50, 0.7, 0.2, 7).unwrap();
        let b = split_frames(50, 0.7, 0.2, 7).unwrap();
        assert_eq!(a.train, b.train);
        assert_eq!(a.test, b.test);

        let c = split_frames(50, 0.7, 0.2, 8).unwrap();
        assert_ne!(a.train, c.train);
    }

    #[test]
    fn test_split_rejects_bad_fractions() {
        assert!(split_frames(10, 0.9, 0.3, 1).is_err());
        assert!(split_frames(10, -0.1, 0.2, 1).is_err());
    }

    #[test]
    fn test_split_small_dataset_keeps_training_nonempty() {
        let split = split_frames(2, 0.1, 0.1, 3).unwrap();
        assert!(!split.train.is_empty());
        assert!(split.validate(2).is_ok());
    }
}
