//! # 奇偶图子命令实现
//!
//! 对照参考能量与预测能量，按训练/验证/测试子集着色散点，
//! 附对角参考线与各子集误差指标。
//!
//! ## 依赖关系
//! - 使用 `cli/analyze.rs` 定义的参数
//! - 使用 `parsers/{extxyz,indices}.rs`
//! - 使用 `utils/{output,stats}.rs`
//! - 使用 `plotters` 渲染图表

use crate::cli::analyze::ParityArgs;
use crate::error::{PotkitError, Result};
use crate::parsers::extxyz;
use crate::parsers::indices::{self, IndexSplit};
use crate::utils::{output, stats};

use plotters::prelude::*;
use std::path::Path;
use tabled::{Table, Tabled};

/// 子集指标行
#[derive(Debug, Clone, Tabled)]
struct SubsetRow {
    #[tabled(rename = "Subset")]
    subset: String,
    #[tabled(rename = "Frames")]
    frames: usize,
    #[tabled(rename = "RMSE (eV)")]
    rmse: String,
    #[tabled(rename = "MAE (eV)")]
    mae: String,
}

/// 执行奇偶图分析
pub fn execute(args: ParityArgs) -> Result<()> {
    output::print_header("Parity Plot");

    let targets = load_energies(&args.targets)?;
    let predictions = load_energies(&args.predictions)?;
    if targets.len() != predictions.len() {
        return Err(PotkitError::LengthMismatch {
            what: "prediction frames".to_string(),
            expected: targets.len(),
            actual: predictions.len(),
        });
    }
    output::print_info(&format!("{} frame pairs loaded", targets.len()));

    // 加载划分：显式目录优先，否则自动发现最新一次运行
    let indices_dir = match &args.indices_dir {
        Some(dir) => dir.clone(),
        None => {
            let found = indices::find_latest_run_indices(&args.run_root)?;
            output::print_info(&format!("Using latest run indices: '{}'", found.display()));
            found
        }
    };
    let split = IndexSplit::load(&indices_dir)?;

    let coverage = split.validate(targets.len())?;
    if !coverage.complete {
        output::print_warning(&format!(
            "{} frames are not covered by any subset",
            coverage.missing
        ));
    }

    // 各子集误差指标
    let table_rows: Vec<SubsetRow> = subsets(&split)
        .into_iter()
        .map(|(name, idx)| {
            let t: Vec<f64> = idx.iter().map(|&i| targets[i]).collect();
            let p: Vec<f64> = idx.iter().map(|&i| predictions[i]).collect();
            SubsetRow {
                subset: name.to_string(),
                frames: idx.len(),
                rmse: format!("{:.6}", stats::rmse(&t, &p)),
                mae: format!("{:.6}", stats::mae(&t, &p)),
            }
        })
        .collect();
    println!("{}", Table::new(&table_rows));

    generate_parity_plot(
        &targets,
        &predictions,
        &split,
        &args.output,
        args.width,
        args.height,
    )?;
    output::print_success(&format!("Parity plot saved to '{}'", args.output.display()));

    if let Some(csv_path) = &args.output_csv {
        save_parity_csv(&targets, &predictions, &split, csv_path)?;
        output::print_success(&format!("Per-frame data saved to '{}'", csv_path.display()));
    }

    Ok(())
}

fn load_energies(path: &Path) -> Result<Vec<f64>> {
    let frames = extxyz::read_frames(path)?;
    frames
        .iter()
        .enumerate()
        .map(|(i, frame)| frame.energy.ok_or(PotkitError::MissingEnergy { frame: i }))
        .collect()
}

fn subsets(split: &IndexSplit) -> [(&'static str, &Vec<usize>); 3] {
    [
        ("train", &split.train),
        ("val", &split.validation),
        ("test", &split.test),
    ]
}

/// 绘制奇偶图
fn generate_parity_plot(
    targets: &[f64],
    predictions: &[f64],
    split: &IndexSplit,
    output_path: &Path,
    width: u32,
    height: u32,
) -> Result<()> {
    let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PotkitError::Other(e.to_string()))?;

    let lo = targets
        .iter()
        .chain(predictions.iter())
        .fold(f64::INFINITY, |a, &b| a.min(b));
    let hi = targets
        .iter()
        .chain(predictions.iter())
        .fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let margin = ((hi - lo).abs()).max(1e-6) * 0.05;
    let range = (lo - margin)..(hi + margin);

    let mut chart = ChartBuilder::on(&root)
        .caption("Energy Parity", ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(range.clone(), range)
        .map_err(|e| PotkitError::Other(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("target energy / eV")
        .y_desc("predicted energy / eV")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| PotkitError::Other(e.to_string()))?;

    // 对角参考线
    let diagonal_color = RGBColor(128, 128, 128);
    chart
        .draw_series(LineSeries::new(
            vec![(lo - margin, lo - margin), (hi + margin, hi + margin)],
            diagonal_color.stroke_width(1),
        ))
        .map_err(|e| PotkitError::Other(e.to_string()))?;

    // 各子集散点
    let subset_colors: [(&str, &Vec<usize>, RGBColor); 3] = [
        ("train", &split.train, RGBColor(0, 128, 0)),
        ("val", &split.validation, RGBColor(255, 165, 0)),
        ("test", &split.test, RGBColor(204, 0, 0)),
    ];

    for (name, idx, color) in subset_colors {
        chart
            .draw_series(
                idx.iter()
                    .map(|&i| Circle::new((targets[i], predictions[i]), 4, color.filled())),
            )
            .map_err(|e| PotkitError::Other(e.to_string()))?
            .label(name)
            .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| PotkitError::Other(e.to_string()))?;

    root.present()
        .map_err(|e| PotkitError::Other(e.to_string()))?;
    Ok(())
}

/// 逐帧对照 CSV
fn save_parity_csv(
    targets: &[f64],
    predictions: &[f64],
    split: &IndexSplit,
    path: &Path,
) -> Result<()> {
    let mut subset_of = vec![""; targets.len()];
    for (name, idx) in subsets(split) {
        for &i in idx {
            subset_of[i] = name;
        }
    }

    let mut wtr = csv::Writer::from_path(path).map_err(PotkitError::CsvError)?;
    wtr.write_record(["frame", "subset", "target_eV", "predicted_eV", "error_eV"])
        .map_err(PotkitError::CsvError)?;

    for i in 0..targets.len() {
        wtr.write_record(&[
            i.to_string(),
            subset_of[i].to_string(),
            format!("{:.10}", targets[i]),
            format!("{:.10}", predictions[i]),
            format!("{:.10}", predictions[i] - targets[i]),
        ])
        .map_err(PotkitError::CsvError)?;
    }

    wtr.flush().map_err(|e| PotkitError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}
