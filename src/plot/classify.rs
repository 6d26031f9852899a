//! Significance classification and label candidate selection.

use crate::data::AnnotatedTable;
use crate::error::{ProteoError, Result};
use crate::plot::{LabelCandidate, Significance};

/// Interpret a p threshold: values below 0.5 are normal-scale p-values and
/// converted to -log10 scale; anything else is already -log10.
pub fn to_log10_threshold(th_p: f64) -> f64 {
    if th_p < 0.5 {
        -th_p.log10()
    } else {
        th_p
    }
}

/// Verify every highlighted gene exists in the table.
pub fn check_highlight(table: &AnnotatedTable, highlight: Option<&[String]>) -> Result<()> {
    let Some(genes) = highlight else {
        return Ok(());
    };
    let missing: Vec<String> = genes
        .iter()
        .filter(|g| !table.gene_names().contains(*g))
        .cloned()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ProteoError::GenesNotFound(missing))
    }
}

/// Classify every row against the color thresholds.
///
/// Highlighted genes are colored by ratio sign alone, ignoring the
/// thresholds. Rows with missing coordinates never pass a threshold and stay
/// not-significant.
pub fn classify(
    ratios: &[f64],
    pvals: &[f64],
    genes: &[String],
    th_p: f64,
    th_ratio: f64,
    highlight: Option<&[String]>,
) -> Vec<Significance> {
    ratios
        .iter()
        .zip(pvals)
        .zip(genes)
        .map(|((&x, &y), gene)| {
            if let Some(list) = highlight {
                if list.contains(gene) {
                    // Strictly positive ratios are Up; zero and NaN fall
                    // through to Down.
                    return if x > 0.0 {
                        Significance::Up
                    } else {
                        Significance::Down
                    };
                }
            }
            if y >= th_p && x.abs() >= th_ratio {
                if x < 0.0 {
                    Significance::Down
                } else {
                    Significance::Up
                }
            } else {
                Significance::NotSignificant
            }
        })
        .collect()
}

/// Select label candidates: visible labels past the text thresholds plus
/// silent obstacles in the band just inside them.
///
/// A visible candidate with a missing coordinate is a hard error; a silent
/// one is skipped. `avoid_conflict` above 1 is read as a percentage.
#[allow(clippy::too_many_arguments)]
pub fn select_candidates(
    ratios: &[f64],
    pvals: &[f64],
    genes: &[String],
    th_p_text: f64,
    th_neg: f64,
    th_pos: f64,
    avoid_conflict: f64,
    highlight: Option<&[String]>,
) -> Result<Vec<LabelCandidate>> {
    let ac = if avoid_conflict > 1.0 {
        avoid_conflict / 100.0
    } else {
        avoid_conflict
    };
    let mut candidates = Vec::new();

    for ((&x, &y), gene) in ratios.iter().zip(pvals).zip(genes) {
        let highlighted = highlight.map_or(false, |list| list.contains(gene));
        let visible = highlighted || (y > th_p_text && (x < th_neg || x > th_pos));
        if visible {
            if !x.is_finite() || !y.is_finite() {
                return Err(ProteoError::MissingLabelValue(gene.clone()));
            }
            candidates.push(LabelCandidate {
                text: gene.clone(),
                x,
                y,
            });
            continue;
        }
        if ac <= 0.0 || !x.is_finite() || !y.is_finite() {
            continue;
        }
        // Near-threshold rows repel visible labels without being drawn.
        let near = y > 0.75 * th_p_text
            && (x < th_neg * (1.0 - ac) || x > th_pos * (1.0 - ac));
        if near {
            candidates.push(LabelCandidate {
                text: String::new(),
                x,
                y,
            });
        }
    }

    Ok(candidates)
}
