//! # generate 子命令实现
//!
//! 用模型计算器驱动 Langevin MD 生成训练数据。
//!
//! ## 功能
//! - 构建内置分子或读入初始结构
//! - BAOAB Langevin 采样，按间隔收集快照
//! - 快照带重新计算的能量与受力，不保留动量
//! - 写出扩展 XYZ 轨迹与热力学记录
//!
//! ## 依赖关系
//! - 使用 `cli/generate.rs` 定义的参数
//! - 使用 `dynamics/langevin.rs`, `potential/calculator.rs`
//! - 使用 `parsers/{extxyz,thermo}.rs`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use crate::cli::generate::GenerateArgs;
use crate::error::{PotkitError, Result};
use crate::models::{molecules, Structure};
use crate::dynamics::Langevin;
use crate::parsers::thermo::{self, ThermoRow};
use crate::parsers::extxyz;
use crate::potential::ModelCalculator;
use crate::utils::{output, progress};

use std::path::Path;

/// 执行 MD 数据生成
pub fn execute(args: GenerateArgs) -> Result<()> {
    output::print_header("Generating MD Training Data");

    if args.sample_interval == 0 || args.thermo_interval == 0 {
        return Err(PotkitError::InvalidArgument(
            "sample and thermo intervals must be positive".to_string(),
        ));
    }

    let calculator = ModelCalculator::from_file(&args.model)?;
    output::print_info(&format!(
        "Loaded model '{}' (species: {})",
        calculator.model().info.name,
        calculator.model().info.species.join(", ")
    ));

    let mut structure = initial_structure(args.initial.as_deref(), &args.molecule)?;
    output::print_info(&format!(
        "{} atoms ({}), {} steps at {} K (dt = {} fs, friction = {} 1/fs)",
        structure.len(),
        structure.species().join(", "),
        args.steps,
        args.temperature,
        args.timestep,
        args.friction
    ));

    let mut integrator = Langevin::new(
        &calculator,
        args.timestep,
        args.temperature,
        args.friction,
        args.seed,
    );

    let pb = progress::create_progress_bar(args.steps as u64, "MD");
    let mut snapshots: Vec<Structure> = Vec::new();
    let mut thermo_rows: Vec<ThermoRow> = Vec::new();

    integrator.run(&mut structure, args.steps, |info, current| {
        pb.inc(1);

        if info.step % args.thermo_interval == 0 {
            thermo_rows.push(ThermoRow {
                time: info.time,
                temperature: info.temperature,
                potential_energy: info.potential_energy,
                kinetic_energy: info.kinetic_energy,
                total_energy: info.total_energy,
            });
        }

        if info.step % args.sample_interval == 0 {
            let mut snapshot = current.clone();
            // 轨迹只保留几何与能量/受力，不保留动量
            snapshot.momenta = None;
            snapshots.push(snapshot);
        }
    })?;
    pb.finish_and_clear();

    if snapshots.is_empty() {
        output::print_warning("Run too short for the sampling interval; no snapshots collected.");
        return Ok(());
    }

    extxyz::write_frames(&args.output, &snapshots)?;
    output::print_success(&format!(
        "{} snapshots written to '{}'",
        snapshots.len(),
        args.output.display()
    ));

    thermo::write_thermo_file(&args.thermo_output, &thermo_rows)?;
    output::print_success(&format!(
        "Thermodynamic trace ({} rows) written to '{}'",
        thermo_rows.len(),
        args.thermo_output.display()
    ));

    Ok(())
}

/// 读入初始结构文件的第一帧，或构建内置分子
pub fn initial_structure(initial: Option<&Path>, molecule: &str) -> Result<Structure> {
    match initial {
        Some(path) => {
            let frames = extxyz::read_frames(path)?;
            let mut first = frames.into_iter().next().ok_or_else(|| {
                PotkitError::ParseError {
                    format: "extxyz".to_string(),
                    path: path.display().to_string(),
                    reason: "file contains no frames".to_string(),
                }
            })?;
            first.clear_results();
            Ok(first)
        }
        None => molecules::build_molecule(molecule),
    }
}
