//! # evaluate 子命令实现
//!
//! 用模型对轨迹逐帧预测能量与受力。
//!
//! ## 功能
//! - 单文件模式：并行逐帧评估，写出带预测的轨迹
//! - 目录模式：按 glob 模式批量处理，逐文件写出
//! - 可选 CSV 导出逐帧能量
//!
//! ## 依赖关系
//! - 使用 `cli/evaluate.rs` 定义的参数
//! - 使用 `batch/runner.rs` 并行求值
//! - 使用 `parsers/extxyz.rs`
//! - 使用 `utils/output.rs`

use crate::batch::EvalRunner;
use crate::cli::evaluate::EvaluateArgs;
use crate::error::{PotkitError, Result};
use crate::models::Structure;
use crate::parsers::extxyz;
use crate::potential::{Evaluation, ModelCalculator};
use crate::utils::output;

use std::fs;
use std::path::{Path, PathBuf};

/// 执行评估
pub fn execute(args: EvaluateArgs) -> Result<()> {
    output::print_header("Evaluating Potential");

    let calculator = ModelCalculator::from_file(&args.model)?;
    output::print_info(&format!(
        "Loaded model '{}' from '{}'",
        calculator.model().info.name,
        args.model.display()
    ));

    let runner = EvalRunner::new(args.jobs);

    if args.input.is_dir() {
        execute_batch(&args, &calculator, &runner)
    } else if args.input.is_file() {
        execute_single(&args, &calculator, &runner)
    } else {
        Err(PotkitError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

/// 单文件模式
fn execute_single(
    args: &EvaluateArgs,
    calculator: &ModelCalculator,
    runner: &EvalRunner,
) -> Result<()> {
    let mut frames = extxyz::read_frames(&args.input)?;
    output::print_info(&format!(
        "{} frames from '{}'",
        frames.len(),
        args.input.display()
    ));

    let evaluations = runner.run(&frames, calculator, "Evaluating")?;
    attach_predictions(&mut frames, &evaluations);

    extxyz::write_frames(&args.output, &frames)?;
    output::print_success(&format!(
        "{} predicted frames written to '{}'",
        frames.len(),
        args.output.display()
    ));

    if let Some(csv_path) = &args.output_csv {
        save_energies_csv(&frames, csv_path)?;
        output::print_success(&format!("Energies saved to '{}'", csv_path.display()));
    }

    Ok(())
}

/// 目录模式：按模式匹配逐文件处理
fn execute_batch(
    args: &EvaluateArgs,
    calculator: &ModelCalculator,
    runner: &EvalRunner,
) -> Result<()> {
    let pattern = format!("{}/{}", args.input.display(), args.pattern);
    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| PotkitError::InvalidArgument(format!("bad pattern '{}': {}", pattern, e)))?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(PotkitError::NoFilesFound { pattern });
    }
    output::print_info(&format!("{} trajectory files matched", files.len()));

    fs::create_dir_all(&args.output).map_err(|e| PotkitError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;

    let mut processed = 0usize;
    let mut skipped = 0usize;
    for file in &files {
        let file_name = file.file_name().unwrap_or_default();
        let out_path = args.output.join(file_name);

        if out_path.exists() && !args.overwrite {
            output::print_skip(&format!("'{}' exists", out_path.display()));
            skipped += 1;
            continue;
        }

        let mut frames = extxyz::read_frames(file)?;
        let evaluations = runner.run(
            &frames,
            calculator,
            &file_name.to_string_lossy(),
        )?;
        attach_predictions(&mut frames, &evaluations);
        extxyz::write_frames(&out_path, &frames)?;
        processed += 1;
    }

    output::print_success(&format!(
        "{} files evaluated, {} skipped, outputs in '{}'",
        processed,
        skipped,
        args.output.display()
    ));
    Ok(())
}

/// 把预测结果附着回帧
fn attach_predictions(frames: &mut [Structure], evaluations: &[Evaluation]) {
    for (frame, evaluation) in frames.iter_mut().zip(evaluations.iter()) {
        frame.energy = Some(evaluation.energy);
        frame.forces = Some(evaluation.forces.clone());
    }
}

/// 逐帧能量 CSV
fn save_energies_csv(frames: &[Structure], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).map_err(PotkitError::CsvError)?;

    wtr.write_record(["frame", "n_atoms", "energy_eV"])
        .map_err(PotkitError::CsvError)?;

    for (i, frame) in frames.iter().enumerate() {
        wtr.write_record(&[
            i.to_string(),
            frame.len().to_string(),
            frame
                .energy
                .map(|e| format!("{:.10}", e))
                .unwrap_or_default(),
        ])
        .map_err(PotkitError::CsvError)?;
    }

    wtr.flush().map_err(|e| PotkitError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
