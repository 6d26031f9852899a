//! Ratio engine: per-group means and pairwise group ratios.
//!
//! Group-mean arithmetic always happens in log2 space; linear input is
//! transformed on entry with zeros mapped to missing. Averaging log2 values
//! corresponds to a geometric mean on the linear scale, the domain convention
//! for intensity data.

use crate::data::{GroupAssignment, IntensityTable, ResultFrame, Scale};
use crate::error::{ProteoError, Result};
use std::collections::HashSet;

/// Default ceiling for the log-scale sanity check. log2 intensities live
/// far below this; anything above it is almost certainly unscaled linear
/// data.
pub const DEFAULT_LOG_CEILING: f64 = 100.0;

/// Per-group mean intensities with an attached scale descriptor.
#[derive(Debug, Clone)]
pub struct GroupMeans {
    groups: Vec<String>,
    frame: ResultFrame,
    scale: Scale,
}

impl GroupMeans {
    /// Declared group labels, in declaration order.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// The mean frame, one column per group.
    pub fn frame(&self) -> &ResultFrame {
        &self.frame
    }

    /// Scale of the stored means.
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Mean column for one group, by position in the declared order.
    fn group_column(&self, idx: usize) -> Vec<f64> {
        (0..self.frame.n_rows())
            .map(|row| self.frame.value(row, idx))
            .collect()
    }

    /// Convert the means to linear scale, renaming the columns accordingly.
    pub fn to_linear(&self) -> Result<GroupMeans> {
        if self.scale == Scale::Linear {
            return Ok(self.clone());
        }
        let columns = self
            .groups
            .iter()
            .enumerate()
            .map(|(idx, group)| {
                let values = self
                    .group_column(idx)
                    .into_iter()
                    .map(|v| 2f64.powf(v))
                    .collect();
                (format!("LFQ {}", group), values)
            })
            .collect();
        Ok(GroupMeans {
            groups: self.groups.clone(),
            frame: ResultFrame::from_columns(columns)?,
            scale: Scale::Linear,
        })
    }
}

/// Compute per-group means, treating zero as missing.
///
/// Linear input is log2-transformed first (zeros become missing before the
/// transform). A feature whose group collapses entirely to missing keeps a
/// missing mean rather than folding to zero.
///
/// When the caller claims the data is already log2-scaled, intensities above
/// `ceiling` fail with a data error; this guards against silently computing
/// nonsense ratios on unscaled linear data.
pub fn group_means(
    table: &IntensityTable,
    assignment: &GroupAssignment,
    ceiling: f64,
) -> Result<GroupMeans> {
    if table.scale() == Scale::Log2 {
        if let Some(max) = table.max_finite() {
            if max > ceiling {
                return Err(ProteoError::ScaleCeiling { max, ceiling });
            }
        }
    }
    // Raw zeros are non-detections; mask them before the transform so a
    // genuine measurement that happens to land on log2 = 0 still counts.
    let log_table = table.mask_nondetections().to_log2();

    let mut columns = Vec::with_capacity(assignment.n_groups());
    for group in assignment.groups() {
        let indices = assignment.column_indices(group);
        let means: Vec<f64> = (0..log_table.n_features())
            .map(|row| {
                let mut sum = 0.0;
                let mut count = 0usize;
                for &col in &indices {
                    let v = log_table.value(row, col);
                    if v.is_finite() {
                        sum += v;
                        count += 1;
                    }
                }
                if count == 0 {
                    f64::NAN
                } else {
                    sum / count as f64
                }
            })
            .collect();
        columns.push((format!("log2 LFQ {}", group), means));
    }

    Ok(GroupMeans {
        groups: assignment.groups().to_vec(),
        frame: ResultFrame::from_columns(columns)?,
        scale: Scale::Log2,
    })
}

/// Compute all pairwise group ratios from the mean table.
///
/// Each unordered pair appears exactly once, in declaration order; self-pairs
/// are skipped. In log space the ratio is a difference of means, in linear
/// space a quotient; `out_scale` selects the output representation.
pub fn ratios(means: &GroupMeans, out_scale: Scale) -> Result<ResultFrame> {
    let ratio_str = match out_scale {
        Scale::Log2 => "log2 ratio",
        Scale::Linear => "ratio",
    };
    let groups = means.groups();
    let mut visited: HashSet<(usize, usize)> = HashSet::new();
    let mut columns = Vec::new();

    for (ia, a) in groups.iter().enumerate() {
        for (ib, b) in groups.iter().enumerate() {
            if ia == ib {
                continue;
            }
            let key = (ia.min(ib), ia.max(ib));
            if !visited.insert(key) {
                continue;
            }
            let col_a = means.group_column(ia);
            let col_b = means.group_column(ib);
            let values: Vec<f64> = col_a
                .iter()
                .zip(&col_b)
                .map(|(&ma, &mb)| match (means.scale(), out_scale) {
                    (Scale::Log2, Scale::Log2) => ma - mb,
                    (Scale::Log2, Scale::Linear) => 2f64.powf(ma - mb),
                    (Scale::Linear, Scale::Linear) => ma / mb,
                    (Scale::Linear, Scale::Log2) => (ma / mb).log2(),
                })
                .collect();
            columns.push((format!("{} ({}/{})", ratio_str, a, b), values));
        }
    }

    ResultFrame::from_columns(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{map_groups, WideColumn, WideTable};
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    fn assignment_for(names: &[&str], groups: &[&str]) -> GroupAssignment {
        let table = WideTable::new(
            names
                .iter()
                .map(|n| (n.to_string(), WideColumn::Numeric(vec![1.0])))
                .collect(),
        )
        .unwrap();
        let groups: Vec<String> = groups.iter().map(|g| g.to_string()).collect();
        map_groups(&table, "LFQ", &groups).unwrap()
    }

    fn log2_table(values: DMatrix<f64>, samples: &[&str]) -> IntensityTable {
        let n = values.nrows();
        IntensityTable::new(
            (0..n).map(|i| format!("P{}", i)).collect(),
            (0..n).map(|i| format!("G{}", i)).collect(),
            samples.iter().map(|s| s.to_string()).collect(),
            values,
            Scale::Log2,
        )
        .unwrap()
    }

    #[test]
    fn test_group_mean_excludes_zeros() {
        let samples = ["LFQ A_1", "LFQ A_2", "LFQ A_3", "LFQ B_1"];
        let assignment = assignment_for(&samples, &["A", "B"]);
        // Row 0 group A: [0, 0, 8] -> mean is 8, not 8/3.
        let values = DMatrix::from_row_slice(1, 4, &[0.0, 0.0, 8.0, 5.0]);
        let means = group_means(&log2_table(values, &samples), &assignment, DEFAULT_LOG_CEILING)
            .unwrap();
        assert_relative_eq!(means.frame().column("log2 LFQ A").unwrap()[0], 8.0);
    }

    #[test]
    fn test_all_missing_group_stays_missing() {
        let samples = ["LFQ A_1", "LFQ A_2", "LFQ B_1"];
        let assignment = assignment_for(&samples, &["A", "B"]);
        let values = DMatrix::from_row_slice(1, 3, &[0.0, f64::NAN, 4.0]);
        let means = group_means(&log2_table(values, &samples), &assignment, DEFAULT_LOG_CEILING)
            .unwrap();
        assert!(means.frame().column("log2 LFQ A").unwrap()[0].is_nan());
        assert_relative_eq!(means.frame().column("log2 LFQ B").unwrap()[0], 4.0);
    }

    #[test]
    fn test_linear_input_transformed_before_mean() {
        let samples = ["LFQ A_1", "LFQ A_2", "LFQ B_1"];
        let assignment = assignment_for(&samples, &["A", "B"]);
        let values = DMatrix::from_row_slice(1, 3, &[4.0, 16.0, 8.0]);
        let table = IntensityTable::new(
            vec!["P0".into()],
            vec!["G0".into()],
            samples.iter().map(|s| s.to_string()).collect(),
            values,
            Scale::Linear,
        )
        .unwrap();
        let means = group_means(&table, &assignment, DEFAULT_LOG_CEILING).unwrap();
        // mean(log2(4), log2(16)) = mean(2, 4) = 3
        assert_relative_eq!(means.frame().column("log2 LFQ A").unwrap()[0], 3.0);
    }

    #[test]
    fn test_linear_intensity_one_counts_toward_mean() {
        let samples = ["LFQ A_1", "LFQ A_2", "LFQ B_1"];
        let assignment = assignment_for(&samples, &["A", "B"]);
        // A raw intensity of 1.0 is a real measurement (log2 = 0), not a
        // non-detection; only raw zeros are excluded.
        let values = DMatrix::from_row_slice(1, 3, &[2.0, 1.0, 4.0]);
        let table = IntensityTable::new(
            vec!["P0".into()],
            vec!["G0".into()],
            samples.iter().map(|s| s.to_string()).collect(),
            values,
            Scale::Linear,
        )
        .unwrap();
        let means = group_means(&table, &assignment, DEFAULT_LOG_CEILING).unwrap();
        // mean(log2(2), log2(1)) = mean(1, 0) = 0.5
        assert_relative_eq!(means.frame().column("log2 LFQ A").unwrap()[0], 0.5);
    }

    #[test]
    fn test_log_scale_ceiling_violation() {
        let samples = ["LFQ A_1", "LFQ B_1"];
        let assignment = assignment_for(&samples, &["A", "B"]);
        let values = DMatrix::from_row_slice(1, 2, &[150.0, 10.0]);
        let err = group_means(&log2_table(values, &samples), &assignment, DEFAULT_LOG_CEILING)
            .unwrap_err();
        assert!(matches!(err, ProteoError::ScaleCeiling { .. }));
    }

    #[test]
    fn test_ratio_antisymmetry() {
        let samples = ["LFQ A_1", "LFQ B_1", "LFQ C_1"];
        let fwd = assignment_for(&samples, &["A", "B", "C"]);
        let rev = assignment_for(&samples, &["C", "B", "A"]);
        let values = DMatrix::from_row_slice(2, 3, &[10.0, 12.0, 11.0, 8.0, 8.5, 9.0]);
        let table = log2_table(values, &samples);

        let r_fwd = ratios(&group_means(&table, &fwd, DEFAULT_LOG_CEILING).unwrap(), Scale::Log2)
            .unwrap();
        let r_rev = ratios(&group_means(&table, &rev, DEFAULT_LOG_CEILING).unwrap(), Scale::Log2)
            .unwrap();

        let ab = r_fwd.column("log2 ratio (A/B)").unwrap();
        let ba = r_rev.column("log2 ratio (B/A)").unwrap();
        for (x, y) in ab.iter().zip(&ba) {
            assert_relative_eq!(*x, -y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_each_unordered_pair_once() {
        let samples = ["LFQ A_1", "LFQ B_1", "LFQ C_1"];
        let assignment = assignment_for(&samples, &["A", "B", "C"]);
        let values = DMatrix::from_row_slice(1, 3, &[10.0, 11.0, 12.0]);
        let means = group_means(&log2_table(values, &samples), &assignment, DEFAULT_LOG_CEILING)
            .unwrap();
        let frame = ratios(&means, Scale::Log2).unwrap();
        assert_eq!(
            frame.names(),
            &[
                "log2 ratio (A/B)".to_string(),
                "log2 ratio (A/C)".to_string(),
                "log2 ratio (B/C)".to_string(),
            ]
        );
    }

    #[test]
    fn test_linear_output_ratio() {
        let samples = ["LFQ A_1", "LFQ B_1"];
        let assignment = assignment_for(&samples, &["A", "B"]);
        let values = DMatrix::from_row_slice(1, 2, &[12.0, 10.0]);
        let means = group_means(&log2_table(values, &samples), &assignment, DEFAULT_LOG_CEILING)
            .unwrap();
        let frame = ratios(&means, Scale::Linear).unwrap();
        // 2^(12 - 10) = 4
        assert_relative_eq!(frame.column("ratio (A/B)").unwrap()[0], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_means_quotient() {
        let samples = ["LFQ A_1", "LFQ B_1"];
        let assignment = assignment_for(&samples, &["A", "B"]);
        let values = DMatrix::from_row_slice(1, 2, &[3.0, 1.0]);
        let means = group_means(&log2_table(values, &samples), &assignment, DEFAULT_LOG_CEILING)
            .unwrap()
            .to_linear()
            .unwrap();
        let frame = ratios(&means, Scale::Log2).unwrap();
        // log2(2^3 / 2^1) = 2
        assert_relative_eq!(frame.column("log2 ratio (A/B)").unwrap()[0], 2.0, epsilon = 1e-12);
    }
}
