//! # LLPR 不确定度量化子命令实现
//!
//! 对照模型真实误差与 LLPR 不确定度：
//! 1. 加载模型，评估参考轨迹的预测能量
//! 2. 以参考能量为真值求逐帧绝对误差
//! 3. 构建数据集并累积读出层协方差，正则化求逆，同数据集标定
//! 4. 逐帧输出不确定度并绘制双对数散点图
//!
//! ## 依赖关系
//! - 使用 `cli/analyze.rs` 定义的参数
//! - 使用 `uq/llpr.rs`, `batch/runner.rs`
//! - 使用 `parsers/extxyz.rs`, `models/dataset.rs`
//! - 使用 `plotters` 渲染图表

use crate::batch::EvalRunner;
use crate::cli::analyze::UqArgs;
use crate::error::{PotkitError, Result};
use crate::models::Dataset;
use crate::parsers::extxyz;
use crate::potential::PotentialModel;
use crate::uq::LlprUncertaintyModel;
use crate::utils::{output, progress};

use plotters::prelude::*;
use std::path::Path;

/// 执行 LLPR 不确定度量化
pub fn execute(args: UqArgs) -> Result<()> {
    output::print_header("LLPR Uncertainty Quantification");

    let model = PotentialModel::load(&args.model_path)?;
    let mut llpr = LlprUncertaintyModel::new(model);
    output::print_info(&format!(
        "Loaded model '{}' ({} readout weights)",
        llpr.model().info.name,
        llpr.model().feature_length()
    ));

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

    // 真实误差：|参考能量 - 预测能量|
    let reference: Vec<f64> = frames
        .iter()
        .enumerate()
        .map(|(i, f)| f.energy.ok_or(PotkitError::MissingEnergy { frame: i }))
        .collect::<Result<_>>()?;

    let evaluations = EvalRunner::new(0).run(&frames, llpr.calculator(), "Evaluating")?;
    let predicted: Vec<f64> = evaluations.iter().map(|e| e.energy).collect();
    let errors: Vec<f64> = reference
        .iter()
        .zip(predicted.iter())
        .map(|(r, p)| (r - p).abs())
        .collect();

    // 数据集 + LLPR 包装
    let dataset = Dataset::from_frames(frames, "energy")?;

    let spinner = progress::create_spinner("Accumulating feature covariance");
    llpr.compute_covariance(&dataset, args.batch_size)?;
    llpr.compute_inverse_covariance(args.regularizer)?;
    // 简单起见在同一数据集上标定；严格做法应使用独立的标定集
    llpr.calibrate(&dataset, args.batch_size)?;
    spinner.finish_and_clear();
    output::print_info(&format!(
        "Covariance over {} structures, regularizer {:e}",
        llpr.n_accumulated(),
        args.regularizer
    ));

    let uncertainties = llpr.uncertainties(&dataset)?;

    output::print_info("Per-frame LLPR uncertainties (eV):");
    println!(
        "{}",
        uncertainties
            .iter()
            .map(|u| format!("{:.6}", u))
            .collect::<Vec<_>>()
            .join(" ")
    );

    generate_uq_plot(
        &errors,
        &uncertainties,
        &args.output_figure,
        args.width,
        args.height,
    )?;
    output::print_success(&format!(
        "Figure saved to '{}'",
        args.output_figure.display()
    ));

    if let Some(csv_path) = &args.output_csv {
        save_uq_csv(&reference, &predicted, &errors, &uncertainties, csv_path)?;
        output::print_success(&format!("Per-frame data saved to '{}'", csv_path.display()));
    }

    Ok(())
}

/// 双对数坐标下的误差-不确定度散点图
fn generate_uq_plot(
    errors: &[f64],
    uncertainties: &[f64],
    output_path: &Path,
    width: u32,
    height: u32,
) -> Result<()> {
    // 对数坐标需要正值；零误差点钳位到下限
    const FLOOR: f64 = 1e-12;
    let points: Vec<(f64, f64)> = errors
        .iter()
        .zip(uncertainties.iter())
        .map(|(&e, &u)| (e.max(FLOOR), u.max(FLOOR)))
        .collect();

    let x_min = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let x_max = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let y_min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let y_max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

    let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PotkitError::Other(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("True error vs LLPR uncertainty", ("sans-serif", 24).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(
            (x_min * 0.5..x_max * 2.0).log_scale(),
            (y_min * 0.5..y_max * 2.0).log_scale(),
        )
        .map_err(|e| PotkitError::Other(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("True error |reference - predicted| (eV)")
        .y_desc("LLPR uncertainty (eV)")
        .x_label_style(("sans-serif", 14))
        .y_label_style(("sans-serif", 14))
        .axis_desc_style(("sans-serif", 16))
        .draw()
        .map_err(|e| PotkitError::Other(e.to_string()))?;

    let point_color = RGBColor(0, 102, 204);
    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, point_color.mix(0.7).filled())),
        )
        .map_err(|e| PotkitError::Other(e.to_string()))?;

    root.present()
        .map_err(|e| PotkitError::Other(e.to_string()))?;
    Ok(())
}

/// 逐帧误差与不确定度 CSV
fn save_uq_csv(
    reference: &[f64],
    predicted: &[f64],
    errors: &[f64],
    uncertainties: &[f64],
    path: &Path,
) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).map_err(PotkitError::CsvError)?;
    wtr.write_record([
        "frame",
        "reference_eV",
        "predicted_eV",
        "abs_error_eV",
        "uncertainty_eV",
    ])
    .map_err(PotkitError::CsvError)?;

    for i in 0..reference.len() {
        wtr.write_record(&[
            i.to_string(),
            format!("{:.10}", reference[i]),
            format!("{:.10}", predicted[i]),
            format!("{:.10}", errors[i]),
            format!("{:.10}", uncertainties[i]),
        ])
        .map_err(PotkitError::CsvError)?;
    }

    wtr.flush().map_err(|e| PotkitError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}
