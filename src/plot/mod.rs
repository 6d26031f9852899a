//! Volcano plot classification and label layout.
//!
//! This module turns an annotated result table into a set of classification
//! colors and collision-avoided label placements. Actual rendering (raster,
//! vector, interactive) is an external surface; the annotations returned
//! here are geometry only.

pub mod classify;
pub mod layout;

use crate::data::AnnotatedTable;
use crate::error::{ProteoError, Result};
use serde::{Deserialize, Serialize};

pub use classify::{classify, select_candidates, to_log10_threshold};
pub use layout::{layout_labels, LayoutConfig, RefObject};

/// Significance classification of one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Significance {
    /// Significantly more abundant (positive ratio).
    Up,
    /// Significantly less abundant (negative ratio).
    Down,
    /// Below the significance thresholds.
    NotSignificant,
}

/// Parameters for volcano classification and label placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolcanoParams {
    /// Color thresholds `(p, ratio)`. A p threshold below 0.5 is read as a
    /// normal-scale p-value and auto-converted to -log10 scale.
    pub th_filter: (f64, f64),
    /// Text thresholds `(p, negative ratio, positive ratio)`; defaults to
    /// the color thresholds when absent.
    pub th_text: Option<(f64, f64, f64)>,
    /// Genes always labeled and colored by ratio sign alone.
    pub highlight: Option<Vec<String>>,
    /// Repulsion force multipliers `(points, text, objects)`.
    pub force: (f64, f64, f64),
    /// Fraction of near-threshold rows kept as silent obstacles. Values
    /// above 1 are read as percentages.
    pub avoid_conflict: f64,
    /// Convergence tolerance for the iterative placement.
    pub precision: f64,
}

impl Default for VolcanoParams {
    fn default() -> Self {
        Self {
            th_filter: (0.05, 0.5),
            th_text: None,
            highlight: None,
            force: (0.5, 0.5, 0.25),
            avoid_conflict: 0.25,
            precision: 0.01,
        }
    }
}

/// One label candidate: gene text (empty for silent obstacles) at its data
/// position.
#[derive(Debug, Clone)]
pub struct LabelCandidate {
    /// Gene name, or empty for a silent obstacle.
    pub text: String,
    /// Ratio (x) coordinate.
    pub x: f64,
    /// -log10 p-value (y) coordinate.
    pub y: f64,
}

impl LabelCandidate {
    /// Whether this candidate only repels other labels without being drawn.
    pub fn is_silent(&self) -> bool {
        self.text.is_empty()
    }
}

/// A rendered annotation: final text position plus the data point it
/// belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedLabel {
    /// Gene name shown to the viewer.
    pub text: String,
    /// Final label x position after layout.
    pub x: f64,
    /// Final label y position after layout.
    pub y: f64,
    /// X of the underlying data point (for a leader line).
    pub anchor_x: f64,
    /// Y of the underlying data point.
    pub anchor_y: f64,
    /// Classification of the underlying point.
    pub significance: Significance,
}

/// Everything a rendering surface needs to draw the volcano plot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolcanoAnnotations {
    /// Per-row classification, aligned with the annotated table.
    pub colors: Vec<Significance>,
    /// Placed visible labels.
    pub labels: Vec<PlacedLabel>,
    /// -log10 p-value threshold line.
    pub th_p: f64,
    /// Ratio threshold lines at +/- this value.
    pub th_ratio: f64,
    /// X axis range (floor(min)-1, ceil(max)+1).
    pub x_range: (f64, f64),
    /// Y axis upper bound (1.1 * max).
    pub y_max: f64,
}

/// Classify all rows and lay out labels for one ratio/p-value column pair.
///
/// This is the full Classify -> SelectCandidates -> Layout -> Finalize pass;
/// the annotated table is not mutated.
pub fn volcano(
    table: &AnnotatedTable,
    col_ratio: &str,
    col_pval: &str,
    params: &VolcanoParams,
) -> Result<VolcanoAnnotations> {
    let ratios = table.column(col_ratio)?;
    let pvals = table.column(col_pval)?;
    classify::check_highlight(table, params.highlight.as_deref())?;

    let (th_p_raw, th_ratio) = params.th_filter;
    let th_p = to_log10_threshold(th_p_raw);
    let (th_p_text_raw, th_neg, th_pos) = params
        .th_text
        .unwrap_or((th_p_raw, -th_ratio, th_ratio));
    let th_p_text = to_log10_threshold(th_p_text_raw);

    let finite_x: Vec<f64> = ratios.iter().copied().filter(|v| v.is_finite()).collect();
    let finite_y: Vec<f64> = pvals.iter().copied().filter(|v| v.is_finite()).collect();
    let x_min = finite_x.iter().copied().fold(f64::INFINITY, f64::min).floor() - 1.0;
    let x_max = finite_x.iter().copied().fold(f64::NEG_INFINITY, f64::max).ceil() + 1.0;
    if x_min < -100.0 || x_max > 100.0 {
        return Err(ProteoError::Numerical(format!(
            "ratio axis [{}, {}] is outside the log2 range; check the input scale",
            x_min, x_max
        )));
    }
    let y_max = 1.1 * finite_y.iter().copied().fold(0.0, f64::max);

    let colors = classify(
        &ratios,
        &pvals,
        table.gene_names(),
        th_p,
        th_ratio,
        params.highlight.as_deref(),
    );
    let candidates = select_candidates(
        &ratios,
        &pvals,
        table.gene_names(),
        th_p_text,
        th_neg,
        th_pos,
        params.avoid_conflict,
        params.highlight.as_deref(),
    )?;

    let points: Vec<(f64, f64)> = ratios
        .iter()
        .zip(&pvals)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .collect();
    let objects = [
        RefObject::HLine(th_p),
        RefObject::VLine(th_ratio),
        RefObject::VLine(-th_ratio),
    ];

    let config = LayoutConfig::for_ranges((x_min, x_max), (0.0, y_max))
        .with_forces(params.force)
        .with_precision(params.precision);
    let positions = layout_labels(&candidates, &points, &objects, &config);

    let labels = candidates
        .iter()
        .zip(&positions)
        .filter(|(c, _)| !c.is_silent())
        .map(|(c, &(x, y))| {
            // Label color follows the color thresholds, by anchor values.
            let significance = if c.x.abs() < th_ratio || c.y < th_p {
                Significance::NotSignificant
            } else if c.x < 0.0 {
                Significance::Down
            } else {
                Significance::Up
            };
            PlacedLabel {
                text: c.text.clone(),
                x,
                y,
                anchor_x: c.x,
                anchor_y: c.y,
                significance,
            }
        })
        .collect();

    Ok(VolcanoAnnotations {
        colors,
        labels,
        th_p,
        th_ratio,
        x_range: (x_min, x_max),
        y_max,
    })
}
