//! Two-sample t-test across all ordered group pairs.

use crate::correct::{correct, Correction};
use crate::data::{GroupAssignment, IntensityTable, ResultFrame};
use crate::error::{ProteoError, Result};
use crate::warnings::{self, Category};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::str::FromStr;

/// Handling of missing values inside one pairwise comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NanPolicy {
    /// Ignore missing entries per comparison.
    Omit,
    /// A missing input yields a missing result.
    Propagate,
    /// Any missing value is a hard validation error.
    Raise,
}

impl FromStr for NanPolicy {
    type Err = ProteoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "omit" => Ok(NanPolicy::Omit),
            "propagate" => Ok(NanPolicy::Propagate),
            "raise" => Ok(NanPolicy::Raise),
            other => Err(ProteoError::InvalidNanPolicy(other.to_string())),
        }
    }
}

/// Run pairwise two-sample t-tests for every ordered group pair.
///
/// Both (A,B) and (B,A) are computed: each direction forms its own
/// correction family, so the corrected values can differ per direction.
/// Correction treats missing p-values as 1.0 internally and restores them
/// to missing in the output. When `log10_out` is set the corrected values
/// are -log10-transformed (after correction, not before).
///
/// The table is expected to hold log2-scaled per-sample values, the same
/// table the group means are derived from.
///
/// Output columns are named `"p value (B/A)"`, or
/// `"-log10 p value (B/A)"` with `log10_out`.
pub fn ttest(
    table: &IntensityTable,
    assignment: &GroupAssignment,
    method: Correction,
    nan_policy: NanPolicy,
    log10_out: bool,
) -> Result<ResultFrame> {
    let groups = assignment.groups();
    let mut columns = Vec::new();

    // Degenerate rows (constant, all-missing) are expected in intensity
    // data; suppress their per-row advisories for the scope of this call.
    let _quiet = warnings::suppress(Category::DegenerateTest);

    for a in groups {
        for b in groups {
            if a == b {
                continue;
            }
            let cols_a = assignment.column_indices(a);
            let cols_b = assignment.column_indices(b);

            let mut p_vals = Vec::with_capacity(table.n_features());
            for row in 0..table.n_features() {
                let xs: Vec<f64> = cols_a.iter().map(|&c| table.value(row, c)).collect();
                let ys: Vec<f64> = cols_b.iter().map(|&c| table.value(row, c)).collect();
                p_vals.push(two_sample_p(&xs, &ys, nan_policy, row)?);
            }

            let corrected = correct(&p_vals, method);
            let (name, values) = if log10_out {
                (
                    format!("-log10 p value ({}/{})", b, a),
                    corrected.into_iter().map(|p| -p.log10()).collect(),
                )
            } else {
                (format!("p value ({}/{})", b, a), corrected)
            };
            columns.push((name, values));
        }
    }

    ResultFrame::from_columns(columns)
}

/// Two-sided pooled-variance t-test p-value for one feature row.
fn two_sample_p(xs: &[f64], ys: &[f64], nan_policy: NanPolicy, row: usize) -> Result<f64> {
    let has_nan = xs.iter().chain(ys).any(|v| v.is_nan());
    match nan_policy {
        NanPolicy::Raise if has_nan => return Err(ProteoError::MissingValue { row }),
        NanPolicy::Propagate if has_nan => return Ok(f64::NAN),
        _ => {}
    }
    let xs: Vec<f64> = xs.iter().copied().filter(|v| !v.is_nan()).collect();
    let ys: Vec<f64> = ys.iter().copied().filter(|v| !v.is_nan()).collect();

    let (n1, n2) = (xs.len(), ys.len());
    if n1 < 2 || n2 < 2 {
        warnings::advise(
            Category::DegenerateTest,
            &format!("feature row {}: too few observations for a t-test", row),
        );
        return Ok(f64::NAN);
    }

    let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
    let (m1, m2) = (mean(&xs), mean(&ys));
    let ss = |v: &[f64], m: f64| v.iter().map(|x| (x - m) * (x - m)).sum::<f64>();
    let df = (n1 + n2 - 2) as f64;
    let pooled_var = (ss(&xs, m1) + ss(&ys, m2)) / df;

    if pooled_var <= 0.0 {
        warnings::advise(
            Category::DegenerateTest,
            &format!("feature row {}: zero variance in both groups", row),
        );
        return Ok(f64::NAN);
    }

    let se = (pooled_var * (1.0 / n1 as f64 + 1.0 / n2 as f64)).sqrt();
    let t = (m1 - m2) / se;
    let dist = StudentsT::new(0.0, 1.0, df).unwrap();
    Ok(2.0 * (1.0 - dist.cdf(t.abs())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{map_groups, Scale, WideColumn, WideTable};
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    fn two_group_setup(values: DMatrix<f64>) -> (IntensityTable, GroupAssignment) {
        let samples = ["LFQ A_1", "LFQ A_2", "LFQ A_3", "LFQ B_1", "LFQ B_2", "LFQ B_3"];
        let wide = WideTable::new(
            samples
                .iter()
                .map(|n| (n.to_string(), WideColumn::Numeric(vec![1.0])))
                .collect(),
        )
        .unwrap();
        let groups = vec!["A".to_string(), "B".to_string()];
        let assignment = map_groups(&wide, "LFQ", &groups).unwrap();
        let n = values.nrows();
        let table = IntensityTable::new(
            (0..n).map(|i| format!("P{}", i)).collect(),
            (0..n).map(|i| format!("G{}", i)).collect(),
            samples.iter().map(|s| s.to_string()).collect(),
            values,
            Scale::Log2,
        )
        .unwrap();
        (table, assignment)
    }

    #[test]
    fn test_ttest_known_value() {
        // scipy.stats.ttest_ind([1, 2, 3], [4, 5, 6]) -> p = 0.021311641128756727
        let values = DMatrix::from_row_slice(1, 6, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let (table, assignment) = two_group_setup(values);
        let frame = ttest(&table, &assignment, Correction::None, NanPolicy::Omit, false).unwrap();
        let p = frame.column("p value (B/A)").unwrap();
        assert_relative_eq!(p[0], 0.021311641128756727, epsilon = 1e-9);
    }

    #[test]
    fn test_both_directions_present_and_equal_uncorrected() {
        let values = DMatrix::from_row_slice(1, 6, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let (table, assignment) = two_group_setup(values);
        let frame = ttest(&table, &assignment, Correction::None, NanPolicy::Omit, false).unwrap();
        let ba = frame.column("p value (B/A)").unwrap();
        let ab = frame.column("p value (A/B)").unwrap();
        // The uncorrected two-sided test is symmetric in its arguments.
        assert_relative_eq!(ba[0], ab[0], epsilon = 1e-12);
    }

    #[test]
    fn test_omit_ignores_missing() {
        let values = DMatrix::from_row_slice(
            1,
            6,
            &[1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0],
        );
        let (table, assignment) = two_group_setup(values);
        let frame = ttest(&table, &assignment, Correction::None, NanPolicy::Omit, false).unwrap();
        let p = frame.column("p value (B/A)").unwrap();
        // scipy.stats.ttest_ind([1, 2], [4, 5, 6]) -> p = 0.01625...
        assert!(p[0] > 0.0 && p[0] < 0.05);
    }

    #[test]
    fn test_propagate_yields_nan() {
        let values = DMatrix::from_row_slice(
            1,
            6,
            &[1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0],
        );
        let (table, assignment) = two_group_setup(values);
        let frame =
            ttest(&table, &assignment, Correction::None, NanPolicy::Propagate, false).unwrap();
        assert!(frame.column("p value (B/A)").unwrap()[0].is_nan());
    }

    #[test]
    fn test_raise_fails_on_missing() {
        let values = DMatrix::from_row_slice(
            1,
            6,
            &[1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0],
        );
        let (table, assignment) = two_group_setup(values);
        let err =
            ttest(&table, &assignment, Correction::None, NanPolicy::Raise, false).unwrap_err();
        assert!(matches!(err, ProteoError::MissingValue { row: 0 }));
    }

    #[test]
    fn test_constant_row_gives_nan() {
        let values = DMatrix::from_row_slice(1, 6, &[5.0, 5.0, 5.0, 5.0, 5.0, 5.0]);
        let (table, assignment) = two_group_setup(values);
        let frame = ttest(&table, &assignment, Correction::None, NanPolicy::Omit, false).unwrap();
        assert!(frame.column("p value (B/A)").unwrap()[0].is_nan());
    }

    #[test]
    fn test_suppression_does_not_leak() {
        let values = DMatrix::from_row_slice(1, 6, &[5.0, 5.0, 5.0, 5.0, 5.0, 5.0]);
        let (table, assignment) = two_group_setup(values);
        let _ = ttest(&table, &assignment, Correction::None, NanPolicy::Omit, false).unwrap();
        assert!(!warnings::is_suppressed(Category::DegenerateTest));
    }

    #[test]
    fn test_log10_output_after_correction() {
        let values = DMatrix::from_row_slice(
            2,
            6,
            &[
                1.0, 2.0, 3.0, 4.0, 5.0, 6.0, //
                1.0, 2.0, 3.0, 1.1, 2.1, 3.1,
            ],
        );
        let (table, assignment) = two_group_setup(values);
        let plain =
            ttest(&table, &assignment, Correction::FdrBh, NanPolicy::Omit, false).unwrap();
        let logged =
            ttest(&table, &assignment, Correction::FdrBh, NanPolicy::Omit, true).unwrap();
        let p = plain.column("p value (B/A)").unwrap();
        let lp = logged.column("-log10 p value (B/A)").unwrap();
        for (raw, log) in p.iter().zip(&lp) {
            assert_relative_eq!(*log, -raw.log10(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_nan_restored_in_corrected_output() {
        let values = DMatrix::from_row_slice(
            2,
            6,
            &[
                5.0, 5.0, 5.0, 5.0, 5.0, 5.0, // constant -> NaN
                1.0, 2.0, 3.0, 4.0, 5.0, 6.0,
            ],
        );
        let (table, assignment) = two_group_setup(values);
        let frame = ttest(&table, &assignment, Correction::FdrBh, NanPolicy::Omit, false).unwrap();
        let p = frame.column("p value (B/A)").unwrap();
        assert!(p[0].is_nan());
        assert!(p[1].is_finite());
    }

    #[test]
    fn test_parse_nan_policy() {
        assert_eq!("omit".parse::<NanPolicy>().unwrap(), NanPolicy::Omit);
        assert!(matches!(
            "drop".parse::<NanPolicy>(),
            Err(ProteoError::InvalidNanPolicy(_))
        ));
    }
}
