//! RMSD-vs-pose panels per exhaustiveness level with the best pose marked.

use std::fs::File;
use std::path::Path;

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::global_minimum::locate_global_minimum;
use crate::config::RmsdConfig;
use crate::data_handling::rmsd_log::{read_rmsd_logs, RmsdGrammar};
use crate::error::{EvalError, Result};
use crate::helper_functions::ensure_parent_dir;
use crate::models::{GlobalMinimum, LevelStatus, RmsdSeries};

/// Shared y range of every panel, in Å.
pub const MAX_RMSD: f64 = 8.0;

const FIGURE_SIZE: (u32, u32) = (1400, 1200);
const LEGEND_HEIGHT: i32 = 70;
const LINE_COLOR: RGBColor = RGBColor(59, 130, 246);
const MIN_COLOR: RGBColor = RED;

const FIGURE_TITLE: &str = "GNINA Re-docking: RMSD Convergence of All Poses vs. Exhaustiveness";

type DrawResult<DB> = std::result::Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Rows and columns of a near-square grid holding `panels` panels.
pub fn grid_shape(panels: usize) -> (usize, usize) {
    let panels = panels.max(1);
    let mut cols = 1;
    while cols * cols < panels {
        cols += 1;
    }
    (panels.div_ceil(cols), cols)
}

pub fn global_minimum_label(min: &GlobalMinimum) -> String {
    format!(
        "Global Minimum RMSD: {:.2} Å at E={}, Pose {}",
        min.rmsd, min.level, min.pose_index
    )
}

/// Reads every level, locates the best pose and writes the figure and the
/// JSON summary. Returns `None` when no RMSD value was found anywhere; no
/// figure is produced in that case.
pub fn analyze_rmsd_convergence(config: &RmsdConfig) -> Result<Option<GlobalMinimum>> {
    let series = read_rmsd_logs(config)?;

    info!("--- Plotting results ---");
    let minimum = locate_global_minimum(&series);
    write_rmsd_summary(&config.summary, config.grammar, &series, minimum)?;

    let Some(min) = minimum else {
        warn!("No valid RMSD data collected. Cannot generate plot.");
        return Ok(None);
    };
    info!("{}", global_minimum_label(&min));

    render_convergence_plot(&config.output, &series, &min)?;
    info!("Successfully created plot: {}", config.output.display());
    Ok(Some(min))
}

/// Draws the panel grid, title and shared legend on `root`.
pub fn draw_convergence_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &RmsdSeries,
    minimum: &GlobalMinimum,
) -> DrawResult<DB> {
    root.fill(&WHITE)?;
    let titled = root.titled(FIGURE_TITLE, ("sans-serif", 30))?;

    let (_, height) = titled.dim_in_pixel();
    let (grid, legend) = titled.split_vertically(height as i32 - LEGEND_HEIGHT);

    let (rows, cols) = grid_shape(series.len());
    let panels = grid.split_evenly((rows, cols));
    for (panel, (level, data)) in panels.iter().zip(series.iter()) {
        let marked = (minimum.level == level).then_some(minimum);
        draw_level_panel(panel, level, data.values(), marked)?;
    }

    draw_shared_legend(&legend, minimum)
}

fn draw_level_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    level: u32,
    rmsds: &[f64],
    minimum: Option<&GlobalMinimum>,
) -> DrawResult<DB> {
    let num_poses = rmsds.len() as i32;
    let x_desc = if rmsds.is_empty() {
        "Pose Index (Frame) [no data]".to_string()
    } else {
        format!("Pose Index (Frame) [0 to {}]", num_poses - 1)
    };

    let mut chart = ChartBuilder::on(area)
        .caption(format!("Exhaustiveness = {level}"), ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-1..num_poses.max(1), 0.0..MAX_RMSD)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("RMSD to Experimental Structure (Å)")
        .axis_desc_style(("sans-serif", 16))
        .x_labels((num_poses + 2) as usize)
        .x_label_formatter(&|x: &i32| {
            if *x >= 0 && *x < num_poses {
                x.to_string()
            } else {
                String::new()
            }
        })
        .draw()?;

    if rmsds.is_empty() {
        return Ok(());
    }

    let points: Vec<(i32, f64)> = rmsds
        .iter()
        .enumerate()
        .map(|(i, &rmsd)| (i as i32, rmsd))
        .collect();
    chart.draw_series(LineSeries::new(points.clone(), LINE_COLOR.mix(0.7).stroke_width(2)))?;
    chart.draw_series(
        points
            .iter()
            .map(|&p| Circle::new(p, 5, LINE_COLOR.mix(0.7).filled())),
    )?;

    if let Some(min) = minimum {
        let pos = (min.pose_index as i32, min.rmsd);
        chart
            .draw_series(std::iter::once(Circle::new(pos, 12, MIN_COLOR.filled())))?
            .label(format!("Global Min RMSD ({:.2} Å)", min.rmsd))
            .legend(|(x, y)| Circle::new((x, y), 6, MIN_COLOR.filled()));
        chart.draw_series(std::iter::once(Circle::new(pos, 12, BLACK.stroke_width(2))))?;
        chart.draw_series(std::iter::once(
            EmptyElement::at(pos)
                + Text::new(
                    format!("MIN: {:.2} Å", min.rmsd),
                    (-40, -40),
                    ("sans-serif", 18).into_font().color(&MIN_COLOR),
                ),
        ))?;

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }

    Ok(())
}

fn draw_shared_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    minimum: &GlobalMinimum,
) -> DrawResult<DB> {
    let (width, height) = area.dim_in_pixel();
    let x = width as i32 / 2 - 260;
    let y = height as i32 / 2;

    area.draw(&Circle::new((x, y), 9, MIN_COLOR.filled()))?;
    area.draw(&Circle::new((x, y), 9, BLACK.stroke_width(1)))?;
    area.draw(&Text::new(
        global_minimum_label(minimum),
        (x + 20, y - 10),
        ("sans-serif", 20).into_font(),
    ))?;
    Ok(())
}

/// Renders the convergence figure to a PNG at `output_path`.
pub fn render_convergence_plot(
    output_path: &Path,
    series: &RmsdSeries,
    minimum: &GlobalMinimum,
) -> Result<()> {
    ensure_parent_dir(output_path)?;
    let root = BitMapBackend::new(output_path, FIGURE_SIZE).into_drawing_area();
    draw_convergence_figure(&root, series, minimum)
        .map_err(|e| EvalError::render(output_path, e))?;
    root.present().map_err(|e| EvalError::render(output_path, e))?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct LevelSummary {
    pub level: u32,
    pub status: LevelStatus,
    pub poses: usize,
    pub min_rmsd: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct RmsdSummary {
    pub grammar: RmsdGrammar,
    pub levels: Vec<LevelSummary>,
    pub global_minimum: Option<GlobalMinimum>,
}

impl RmsdSummary {
    pub fn new(grammar: RmsdGrammar, series: &RmsdSeries, global_minimum: Option<GlobalMinimum>) -> Self {
        let levels = series
            .iter()
            .map(|(level, data)| {
                let values = data.values();
                LevelSummary {
                    level,
                    status: data.status(),
                    poses: values.len(),
                    min_rmsd: values.iter().copied().reduce(f64::min),
                }
            })
            .collect();
        Self {
            grammar,
            levels,
            global_minimum,
        }
    }
}

pub fn write_rmsd_summary(
    path: &Path,
    grammar: RmsdGrammar,
    series: &RmsdSeries,
    minimum: Option<GlobalMinimum>,
) -> Result<()> {
    ensure_parent_dir(path)?;
    let summary = RmsdSummary::new(grammar, series, minimum);
    let file = File::create(path).map_err(|e| EvalError::io(path, e))?;
    serde_json::to_writer_pretty(file, &summary)?;
    info!("RMSD summary saved to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LevelData;
    use std::path::PathBuf;

    fn write_log(base: &Path, level: u32, content: &str) {
        let dir = base.join(level.to_string());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("rmsd.dat"), content).unwrap();
    }

    #[test]
    fn grid_is_two_by_two_for_four_levels() {
        assert_eq!(grid_shape(4), (2, 2));
        assert_eq!(grid_shape(1), (1, 1));
        assert_eq!(grid_shape(3), (2, 2));
        assert_eq!(grid_shape(5), (2, 3));
        assert_eq!(grid_shape(0), (1, 1));
    }

    #[test]
    fn legend_label_names_level_and_pose() {
        let min = GlobalMinimum {
            level: 16,
            pose_index: 1,
            rmsd: 0.4,
        };
        assert_eq!(
            global_minimum_label(&min),
            "Global Minimum RMSD: 0.40 Å at E=16, Pose 1"
        );
    }

    #[test]
    fn summary_records_status_per_level() {
        let series: RmsdSeries = vec![
            (8, LevelData::Present(vec![2.1, 0.9, 3.0])),
            (16, LevelData::Present(vec![])),
            (24, LevelData::Missing),
        ]
        .into_iter()
        .collect();
        let min = locate_global_minimum(&series);
        let json = serde_json::to_value(RmsdSummary::new(RmsdGrammar::V2, &series, min)).unwrap();

        assert_eq!(json["grammar"], "v2");
        assert_eq!(json["levels"][0]["status"], "ok");
        assert_eq!(json["levels"][0]["min_rmsd"], 0.9);
        assert_eq!(json["levels"][1]["status"], "empty");
        assert_eq!(json["levels"][2]["status"], "missing");
        assert!(json["levels"][2]["min_rmsd"].is_null());
        assert_eq!(json["global_minimum"]["level"], 8);
        assert_eq!(json["global_minimum"]["pose_index"], 1);
    }

    #[test]
    fn no_data_skips_plot_but_writes_summary() {
        let dir = tempfile::tempdir().unwrap();
        write_log(dir.path(), 8, "nothing useful\n");

        let config = RmsdConfig {
            base_dir: dir.path().to_path_buf(),
            output: dir.path().join("conv.png"),
            summary: dir.path().join("summary.json"),
            ..RmsdConfig::default()
        };
        let result = analyze_rmsd_convergence(&config).unwrap();

        assert_eq!(result, None);
        assert!(!config.output.exists());
        assert!(config.summary.exists());
    }

    #[test]
    fn missing_and_empty_levels_still_render() {
        let dir = tempfile::tempdir().unwrap();
        write_log(
            dir.path(),
            8,
            "RMSD a.pdb:b.pdb 2.1\nRMSD a.pdb:b.pdb 0.9\nRMSD a.pdb:b.pdb 3.0\n",
        );
        write_log(dir.path(), 16, "");

        let config = RmsdConfig {
            base_dir: dir.path().to_path_buf(),
            output: dir.path().join("figs/conv.png"),
            summary: dir.path().join("figs/summary.json"),
            ..RmsdConfig::default()
        };
        let min = analyze_rmsd_convergence(&config).unwrap();

        assert_eq!(
            min,
            Some(GlobalMinimum {
                level: 8,
                pose_index: 1,
                rmsd: 0.9
            })
        );
        assert!(config.output.exists());

        let summary: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&config.summary).unwrap()).unwrap();
        let statuses: Vec<&str> = summary["levels"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["status"].as_str().unwrap())
            .collect();
        assert_eq!(statuses, ["ok", "empty", "missing", "missing"]);
    }

    #[test]
    fn unwritable_figure_is_an_error() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let output: PathBuf = blocker.path().join("conv.png");
        let series: RmsdSeries = vec![(8, LevelData::Present(vec![1.0]))].into_iter().collect();
        let min = locate_global_minimum(&series).unwrap();
        assert!(render_convergence_plot(&output, &series, &min).is_err());
    }
}
