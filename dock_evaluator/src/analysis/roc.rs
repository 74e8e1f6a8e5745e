use std::path::Path;

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::consensus::{consensus_scores, score_table};
use crate::config::RocConfig;
use crate::data_handling::labeling::MarkerLabeler;
use crate::data_handling::sdf::read_score_records;
use crate::error::{EvalError, Result};
use crate::helper_functions::{dataframe_to_csv, ensure_parent_dir};
use crate::models::ScoreRecord;

/// Square canvas so the unit ROC square keeps an equal aspect.
const ROC_CANVAS: (u32, u32) = (900, 900);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocPoint {
    pub threshold: f64,
    pub fpr: f64,
    pub tpr: f64,
}

/// FPR/TPR steps from (0,0) to (1,1) with their trapezoidal AUC.
#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    pub points: Vec<RocPoint>,
    pub auc: f64,
}

impl RocCurve {
    /// Threshold maximising Youden's J (`tpr - fpr`); the first one wins on ties.
    pub fn youden_threshold(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .filter(|p| p.threshold.is_finite())
            .fold(None, |best: Option<(f64, f64)>, p| {
                let j = p.tpr - p.fpr;
                match best {
                    Some((_, best_j)) if best_j >= j => best,
                    _ => Some((p.threshold, j)),
                }
            })
    }
}

/// AUC is only defined when both classes are present.
#[derive(Debug, Clone, PartialEq)]
pub enum RocEvaluation {
    Curve(RocCurve),
    Undefined { positives: usize, negatives: usize },
}

impl RocEvaluation {
    pub fn auc(&self) -> Option<f64> {
        match self {
            RocEvaluation::Curve(curve) => Some(curve.auc),
            RocEvaluation::Undefined { .. } => None,
        }
    }
}

/// One named signal and its evaluation.
#[derive(Debug, Clone)]
pub struct SignalRoc {
    pub name: String,
    pub positives: usize,
    pub negatives: usize,
    pub evaluation: RocEvaluation,
}

impl SignalRoc {
    pub fn legend_label(&self) -> String {
        match self.evaluation.auc() {
            Some(auc) => format!("{} (AUC = {:.2})", self.name, auc),
            None => format!("{} (AUC undefined)", self.name),
        }
    }
}

/// Sweeps a threshold down the distinct values of `signal` (higher means
/// "predicted active"). Tied values move in one step.
pub fn calculate_roc(labels: &[bool], signal: &[f64]) -> Result<RocEvaluation> {
    if signal.len() != labels.len() {
        return Err(EvalError::LengthMismatch {
            signal: signal.len(),
            labels: labels.len(),
        });
    }
    if signal.is_empty() {
        return Err(EvalError::EmptySignal);
    }

    let positives = labels.iter().filter(|&&l| l).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Ok(RocEvaluation::Undefined {
            positives,
            negatives,
        });
    }

    let mut order: Vec<usize> = (0..signal.len()).collect();
    order.sort_by(|&a, &b| signal[b].total_cmp(&signal[a]));

    let mut points = vec![RocPoint {
        threshold: f64::INFINITY,
        fpr: 0.0,
        tpr: 0.0,
    }];
    let (mut tp, mut fp) = (0usize, 0usize);
    let mut i = 0;
    while i < order.len() {
        let threshold = signal[order[i]];
        while i < order.len() && signal[order[i]] == threshold {
            if labels[order[i]] {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        points.push(RocPoint {
            threshold,
            fpr: fp as f64 / negatives as f64,
            tpr: tp as f64 / positives as f64,
        });
    }

    let auc = calculate_auc(&points);
    Ok(RocEvaluation::Curve(RocCurve { points, auc }))
}

/// Area under the ROC curve using the trapezoidal rule.
fn calculate_auc(points: &[RocPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| (w[1].fpr - w[0].fpr) * (w[1].tpr + w[0].tpr) / 2.0)
        .sum()
}

/// The three compared signals, oriented so that higher is better.
pub fn score_signals(records: &[ScoreRecord], consensus: &[f64]) -> Vec<(&'static str, Vec<f64>)> {
    vec![
        ("Vinardo", records.iter().map(|r| -r.score_a).collect()),
        ("CNNaffinity", records.iter().map(|r| r.score_b).collect()),
        ("Consensus", consensus.to_vec()),
    ]
}

pub fn evaluate_signals(records: &[ScoreRecord], consensus: &[f64]) -> Result<Vec<SignalRoc>> {
    let labels: Vec<bool> = records.iter().map(|r| r.label).collect();
    let positives = labels.iter().filter(|&&l| l).count();
    let negatives = labels.len() - positives;

    let mut rocs = Vec::new();
    for (name, signal) in score_signals(records, consensus) {
        let evaluation = calculate_roc(&labels, &signal)?;
        match &evaluation {
            RocEvaluation::Curve(curve) => {
                info!("Calculated ROC for {} - AUC: {:.3}", name, curve.auc);
                if let Some((threshold, j)) = curve.youden_threshold() {
                    debug!("{} threshold (Youden-J {:.3}): {:.3}", name, j, threshold);
                }
            }
            RocEvaluation::Undefined { .. } => warn!(
                "AUC for {} is undefined: {} actives and {} decoys, both classes are required",
                name, positives, negatives
            ),
        }
        rocs.push(SignalRoc {
            name: name.to_string(),
            positives,
            negatives,
            evaluation,
        });
    }
    Ok(rocs)
}

/// Reads the scored SD file, evaluates Vinardo, CNNaffinity and their
/// consensus, then writes the ROC figure and the AUC table.
pub fn compare_roc_curves(config: &RocConfig) -> Result<Vec<SignalRoc>> {
    let labeler = MarkerLabeler::new(config.active_marker.as_str());
    let records = read_score_records(&config.input, &config.fields, labeler)?;
    let consensus = consensus_scores(&records);

    if let Some(path) = &config.score_table {
        let mut df = score_table(&records, &consensus)?;
        dataframe_to_csv(&mut df, path)?;
    }

    let rocs = evaluate_signals(&records, &consensus)?;

    render_roc_plot(&config.output, &rocs)?;
    info!("ROC comparison saved to: {}", config.output.display());

    save_auc_values(&config.auc_table, &rocs)?;
    Ok(rocs)
}

/// Draws all curves on `root`. The caller owns the canvas.
pub fn draw_roc_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    rocs: &[SignalRoc],
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let axis_font = ("sans-serif", 22);
    let label_font = ("sans-serif", 18);

    let colors = [
        RGBColor(0, 119, 182),
        RGBColor(217, 72, 1),
        RGBColor(0, 153, 136),
        RGBColor(153, 0, 153),
    ];

    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..1.0, 0.0..1.0)?;

    chart
        .configure_mesh()
        .x_desc("False Positive Rate")
        .y_desc("True Positive Rate")
        .axis_desc_style(axis_font)
        .label_style(label_font)
        .draw()?;

    chart.draw_series(LineSeries::new(
        vec![(0.0, 0.0), (1.0, 1.0)],
        BLACK.mix(0.5).stroke_width(1),
    ))?;

    for (i, roc) in rocs.iter().enumerate() {
        let color = colors[i % colors.len()];
        let points: Vec<(f64, f64)> = match &roc.evaluation {
            RocEvaluation::Curve(curve) => curve.points.iter().map(|p| (p.fpr, p.tpr)).collect(),
            RocEvaluation::Undefined { .. } => Vec::new(),
        };
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))?
            .label(roc.legend_label())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 25, y)], color.stroke_width(3)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(label_font)
        .position(SeriesLabelPosition::LowerRight)
        .draw()?;

    Ok(())
}

/// Renders the ROC figure to a PNG at `output_path`.
pub fn render_roc_plot(output_path: &Path, rocs: &[SignalRoc]) -> Result<()> {
    ensure_parent_dir(output_path)?;
    let root = BitMapBackend::new(output_path, ROC_CANVAS).into_drawing_area();
    draw_roc_chart(&root, rocs).map_err(|e| EvalError::render(output_path, e))?;
    root.present().map_err(|e| EvalError::render(output_path, e))?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct AucRow<'a> {
    signal: &'a str,
    auc: Option<String>,
    positives: usize,
    negatives: usize,
}

/// Save AUC values to a CSV file; undefined AUCs are left empty.
pub fn save_auc_values(path: &Path, rocs: &[SignalRoc]) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut wtr = csv::Writer::from_path(path)?;
    for roc in rocs {
        wtr.serialize(AucRow {
            signal: &roc.name,
            auc: roc.evaluation.auc().map(|auc| format!("{:.5}", auc)),
            positives: roc.positives,
            negatives: roc.negatives,
        })?;
    }
    wtr.flush().map_err(|e| EvalError::io(path, e))?;
    info!("AUC values saved to: {}", path.display());
    Ok(())
}
