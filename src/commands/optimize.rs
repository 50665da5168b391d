//! # optimize 子命令实现
//!
//! 用 LBFGS 将结构弛豫到受力阈值以下。
//!
//! ## 功能
//! - 构建内置分子或读入初始结构
//! - 逐步打印能量与最大受力
//! - 写出弛豫后的结构，可选中间轨迹
//!
//! ## 依赖关系
//! - 使用 `cli/optimize.rs` 定义的参数
//! - 使用 `dynamics/lbfgs.rs`, `potential/calculator.rs`
//! - 使用 `commands/generate.rs` 的初始结构加载
//! - 使用 `utils/output.rs`

use crate::cli::optimize::OptimizeArgs;
use crate::commands::generate::initial_structure;
use crate::dynamics::Lbfgs;
use crate::error::Result;
use crate::models::Structure;
use crate::parsers::extxyz;
use crate::potential::ModelCalculator;
use crate::utils::output;

/// 执行结构弛豫
pub fn execute(args: OptimizeArgs) -> Result<()> {
    output::print_header("Optimizing Structure");

    let calculator = ModelCalculator::from_file(&args.model)?;
    output::print_info(&format!(
        "Loaded model '{}' from '{}'",
        calculator.model().info.name,
        args.model.display()
    ));

    let mut structure = initial_structure(args.initial.as_deref(), &args.molecule)?;
    output::print_info(&format!(
        "{} atoms, fmax target {} eV/A",
        structure.len(),
        args.fmax
    ));
    output::print_separator();

    let optimizer = Lbfgs::new(&calculator).with_maxstep(args.maxstep);

    let mut trajectory: Vec<Structure> = Vec::new();
    let collect_trajectory = args.trajectory.is_some();

    let result = optimizer.run(&mut structure, args.fmax, args.max_steps, |step, current| {
        println!(
            "  step {:>4}   E = {:>14.6} eV   fmax = {:>10.6} eV/A",
            step.step, step.energy, step.fmax
        );
        if collect_trajectory {
            trajectory.push(current.clone());
        }
    })?;

    output::print_separator();
    if result.converged {
        output::print_success(&format!(
            "Converged in {} steps: E = {:.6} eV, fmax = {:.6} eV/A",
            result.steps, result.energy, result.fmax
        ));
    } else {
        output::print_warning(&format!(
            "Not converged after {} steps: fmax = {:.6} eV/A (target {})",
            result.steps, result.fmax, args.fmax
        ));
    }

    extxyz::write_frames(&args.output, std::slice::from_ref(&structure))?;
    output::print_success(&format!(
        "Relaxed structure written to '{}'",
        args.output.display()
    ));

    if let Some(trajectory_path) = &args.trajectory {
        trajectory.push(structure);
        extxyz::write_frames(trajectory_path, &trajectory)?;
        output::print_success(&format!(
            "Optimization trajectory ({} frames) written to '{}'",
            trajectory.len(),
            trajectory_path.display()
        ));
    }

    Ok(())
}
