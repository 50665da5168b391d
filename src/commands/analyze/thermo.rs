//! # 热力学轨迹图子命令实现
//!
//! 把 MD 的热力学记录画成 1×4 联图：温度、势能、动能、总能
//! 随时间的变化。
//!
//! ## 依赖关系
//! - 使用 `cli/analyze.rs` 定义的参数
//! - 使用 `parsers/thermo.rs`
//! - 使用 `utils/output.rs`
//! - 使用 `plotters` 渲染图表

use crate::cli::analyze::ThermoArgs;
use crate::error::{PotkitError, Result};
use crate::parsers::thermo::{self, ThermoRow};
use crate::utils::{output, stats};

use plotters::prelude::*;

/// 执行热力学轨迹绘图
pub fn execute(args: ThermoArgs) -> Result<()> {
    output::print_header("Thermodynamic Trace");

    let rows = thermo::read_thermo_file(&args.input)?;
    if rows.is_empty() {
        return Err(PotkitError::ParseError {
            format: "thermo".to_string(),
            path: args.input.display().to_string(),
            reason: "table contains no rows".to_string(),
        });
    }
    output::print_info(&format!(
        "{} rows spanning {:.1} fs",
        rows.len(),
        rows.last().unwrap().time - rows[0].time
    ));

    let temperatures: Vec<f64> = rows.iter().map(|r| r.temperature).collect();
    output::print_info(&format!(
        "Mean temperature: {:.1} K",
        stats::mean(&temperatures)
    ));

    generate_thermo_plot(&rows, &args)?;
    output::print_success(&format!("Figure saved to '{}'", args.output.display()));
    Ok(())
}

/// 绘制 1×4 联图
fn generate_thermo_plot(rows: &[ThermoRow], args: &ThermoArgs) -> Result<()> {
    let root =
        BitMapBackend::new(&args.output, (args.width, args.height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PotkitError::Other(e.to_string()))?;

    let panels = root.split_evenly((1, 4));

    let series: [(&str, fn(&ThermoRow) -> f64); 4] = [
        ("Temp / K", |r| r.temperature),
        ("Pot. E / eV", |r| r.potential_energy),
        ("Kin. E / eV", |r| r.kinetic_energy),
        ("Total E / eV", |r| r.total_energy),
    ];

    let t_min = rows[0].time;
    let t_max = rows.last().unwrap().time;
    let line_color = RGBColor(0, 102, 204);

    for (panel, (label, extract)) in panels.iter().zip(series.into_iter()) {
        let y_min = rows.iter().map(extract).fold(f64::INFINITY, f64::min);
        let y_max = rows.iter().map(extract).fold(f64::NEG_INFINITY, f64::max);
        let y_margin = ((y_max - y_min).abs()).max(1e-6) * 0.1;

        let mut chart = ChartBuilder::on(panel)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(t_min..t_max, (y_min - y_margin)..(y_max + y_margin))
            .map_err(|e| PotkitError::Other(e.to_string()))?;

        chart
            .configure_mesh()
            .x_desc("time / fs")
            .x_label_style(("sans-serif", 13))
            .y_label_style(("sans-serif", 13))
            .axis_desc_style(("sans-serif", 15))
            .draw()
            .map_err(|e| PotkitError::Other(e.to_string()))?;

        chart
            .draw_series(LineSeries::new(
                rows.iter().map(|r| (r.time, extract(r))),
                line_color.stroke_width(2),
            ))
            .map_err(|e| PotkitError::Other(e.to_string()))?
            .label(label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 16, y)], line_color.stroke_width(2))
            });

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(|e| PotkitError::Other(e.to_string()))?;
    }

    root.present()
        .map_err(|e| PotkitError::Other(e.to_string()))?;
    Ok(())
}
