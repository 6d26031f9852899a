//! Intensity table and scale handling for label-free quantification data.

use crate::error::{ProteoError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Scale of the values stored in a table.
///
/// The scale travels with each table value instead of being mutable
/// bookkeeping on an engine instance, so the same engine can be reused
/// across tables in different scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scale {
    /// Values are log2-transformed intensities.
    Log2,
    /// Values are raw (linear) intensities.
    Linear,
}

/// A column of the caller-provided wide table.
#[derive(Debug, Clone)]
pub enum WideColumn {
    /// Free-text column (identifiers, annotation markers).
    Text(Vec<String>),
    /// Numeric column (sample intensities).
    Numeric(Vec<f64>),
}

impl WideColumn {
    fn len(&self) -> usize {
        match self {
            WideColumn::Text(v) => v.len(),
            WideColumn::Numeric(v) => v.len(),
        }
    }
}

/// Caller-provided raw table: one row per feature, named columns.
///
/// This is the external input boundary. How the table got into memory
/// (CSV, TSV, a database) is not this crate's concern.
#[derive(Debug, Clone)]
pub struct WideTable {
    names: Vec<String>,
    columns: Vec<WideColumn>,
    n_rows: usize,
}

impl WideTable {
    /// Create a wide table from named columns. All columns must have the
    /// same length.
    pub fn new(columns: Vec<(String, WideColumn)>) -> Result<Self> {
        let n_rows = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        for (_, col) in &columns {
            if col.len() != n_rows {
                return Err(ProteoError::DimensionMismatch {
                    expected: n_rows,
                    actual: col.len(),
                });
            }
        }
        let (names, columns) = columns.into_iter().unzip();
        Ok(Self {
            names,
            columns,
            n_rows,
        })
    }

    /// Number of feature rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// All column names, in table order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    fn column(&self, name: &str) -> Option<&WideColumn> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    /// Get a text column, failing with a configuration error if absent or
    /// not textual.
    pub fn text_column(&self, name: &str) -> Result<&[String]> {
        match self.column(name) {
            Some(WideColumn::Text(v)) => Ok(v),
            _ => Err(ProteoError::MissingColumn(name.to_string())),
        }
    }

    /// Get a numeric column, failing with a configuration error if absent
    /// or not numeric.
    pub fn numeric_column(&self, name: &str) -> Result<&[f64]> {
        match self.column(name) {
            Some(WideColumn::Numeric(v)) => Ok(v),
            _ => Err(ProteoError::MissingColumn(name.to_string())),
        }
    }

    /// Keep only the rows selected by `keep`.
    fn subset_rows(&self, keep: &[bool]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|col| match col {
                WideColumn::Text(v) => WideColumn::Text(
                    v.iter()
                        .zip(keep)
                        .filter(|(_, &k)| k)
                        .map(|(x, _)| x.clone())
                        .collect(),
                ),
                WideColumn::Numeric(v) => WideColumn::Numeric(
                    v.iter()
                        .zip(keep)
                        .filter(|(_, &k)| k)
                        .map(|(x, _)| *x)
                        .collect(),
                ),
            })
            .collect();
        let n_rows = keep.iter().filter(|&&k| k).count();
        Self {
            names: self.names.clone(),
            columns,
            n_rows,
        }
    }
}

/// Default annotation markers dropped by [`pre_filter`].
///
/// These columns flag decoy and artifact rows in the upstream search output;
/// a non-empty entry marks the row for removal.
pub const DEFAULT_FILTER_COLUMNS: [&str; 3] =
    ["Only identified by site", "Reverse", "Contaminant"];

/// Remove rows flagged in any of the given annotation columns.
///
/// A row is dropped when the filter column holds a non-empty marker.
/// Filter columns absent from the table are skipped.
pub fn pre_filter(table: &WideTable, filter_columns: &[&str]) -> WideTable {
    let mut keep = vec![true; table.n_rows()];
    for name in filter_columns {
        if let Some(WideColumn::Text(values)) = table.column(name) {
            for (k, value) in keep.iter_mut().zip(values) {
                if !value.trim().is_empty() {
                    *k = false;
                }
            }
        }
    }
    table.subset_rows(&keep)
}

/// Intensity matrix with feature identity columns attached.
///
/// Rows are features (proteins), columns are samples. Missing measurements
/// are stored as NaN; a zero intensity in the raw input means non-detection
/// and is converted to NaN when entering log space.
#[derive(Debug, Clone)]
pub struct IntensityTable {
    accessions: Vec<String>,
    gene_names: Vec<String>,
    sample_names: Vec<String>,
    values: DMatrix<f64>,
    scale: Scale,
}

impl IntensityTable {
    /// Create a table from its parts, validating dimension agreement.
    pub fn new(
        accessions: Vec<String>,
        gene_names: Vec<String>,
        sample_names: Vec<String>,
        values: DMatrix<f64>,
        scale: Scale,
    ) -> Result<Self> {
        if accessions.len() != values.nrows() {
            return Err(ProteoError::DimensionMismatch {
                expected: values.nrows(),
                actual: accessions.len(),
            });
        }
        if gene_names.len() != values.nrows() {
            return Err(ProteoError::DimensionMismatch {
                expected: values.nrows(),
                actual: gene_names.len(),
            });
        }
        if sample_names.len() != values.ncols() {
            return Err(ProteoError::DimensionMismatch {
                expected: values.ncols(),
                actual: sample_names.len(),
            });
        }
        Ok(Self {
            accessions,
            gene_names,
            sample_names,
            values,
            scale,
        })
    }

    /// Extract an intensity table from a wide table: identity columns plus
    /// the given sample columns, in order.
    pub fn from_wide(
        table: &WideTable,
        col_accession: &str,
        col_gene: &str,
        sample_columns: &[String],
        scale: Scale,
    ) -> Result<Self> {
        let accessions = table.text_column(col_accession)?.to_vec();
        let gene_names = table.text_column(col_gene)?.to_vec();
        let n = table.n_rows();
        let mut values = DMatrix::from_element(n, sample_columns.len(), f64::NAN);
        for (j, name) in sample_columns.iter().enumerate() {
            let col = table.numeric_column(name)?;
            for (i, &v) in col.iter().enumerate() {
                values[(i, j)] = v;
            }
        }
        Self::new(
            accessions,
            gene_names,
            sample_columns.to_vec(),
            values,
            scale,
        )
    }

    /// Number of features (rows).
    pub fn n_features(&self) -> usize {
        self.values.nrows()
    }

    /// Number of samples (columns).
    pub fn n_samples(&self) -> usize {
        self.values.ncols()
    }

    /// Feature accession ids.
    pub fn accessions(&self) -> &[String] {
        &self.accessions
    }

    /// Human-readable feature names.
    pub fn gene_names(&self) -> &[String] {
        &self.gene_names
    }

    /// Sample column names, in matrix column order.
    pub fn sample_names(&self) -> &[String] {
        &self.sample_names
    }

    /// The scale descriptor for the stored values.
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Value at (feature, sample).
    pub fn value(&self, feature: usize, sample: usize) -> f64 {
        self.values[(feature, sample)]
    }

    /// Largest finite value in the matrix, if any.
    pub fn max_finite(&self) -> Option<f64> {
        self.values
            .iter()
            .filter(|v| v.is_finite())
            .copied()
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }

    /// Return a copy with zero intensities replaced by NaN.
    ///
    /// Zero means the feature was not detected in that sample, regardless of
    /// scale; downstream statistics must not treat it as a measurement.
    pub fn mask_nondetections(&self) -> Self {
        let values = self.values.map(|v| if v == 0.0 { f64::NAN } else { v });
        Self {
            accessions: self.accessions.clone(),
            gene_names: self.gene_names.clone(),
            sample_names: self.sample_names.clone(),
            values,
            scale: self.scale,
        }
    }

    /// Return a log2-scaled copy of this table.
    ///
    /// Zeros are converted to NaN before the transform: zero intensity means
    /// the feature was not detected, not that its abundance is one. A table
    /// already in log2 scale is returned unchanged.
    pub fn to_log2(&self) -> Self {
        if self.scale == Scale::Log2 {
            return self.clone();
        }
        let values = self.values.map(|v| if v > 0.0 { v.log2() } else { f64::NAN });
        Self {
            accessions: self.accessions.clone(),
            gene_names: self.gene_names.clone(),
            sample_names: self.sample_names.clone(),
            values,
            scale: Scale::Log2,
        }
    }

    /// Return a linear-scaled copy of this table. NaN entries stay missing;
    /// zeros are never reintroduced.
    pub fn to_linear(&self) -> Self {
        if self.scale == Scale::Linear {
            return self.clone();
        }
        let values = self.values.map(|v| 2f64.powf(v));
        Self {
            accessions: self.accessions.clone(),
            gene_names: self.gene_names.clone(),
            sample_names: self.sample_names.clone(),
            values,
            scale: Scale::Linear,
        }
    }
}
