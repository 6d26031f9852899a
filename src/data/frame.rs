//! Named-column result frames and the annotated output table.

use crate::error::{ProteoError, Result};
use nalgebra::DMatrix;
use std::collections::HashSet;

/// An ordered set of named f64 columns over the feature index.
///
/// Every transformation in the pipeline produces a new frame; frames are
/// never mutated in place.
#[derive(Debug, Clone)]
pub struct ResultFrame {
    names: Vec<String>,
    values: DMatrix<f64>,
}

impl ResultFrame {
    /// Create a frame from a name list and a matching matrix.
    pub fn new(names: Vec<String>, values: DMatrix<f64>) -> Result<Self> {
        if names.len() != values.ncols() {
            return Err(ProteoError::DimensionMismatch {
                expected: values.ncols(),
                actual: names.len(),
            });
        }
        Ok(Self { names, values })
    }

    /// Create a frame from named columns of equal length.
    pub fn from_columns(columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let n_rows = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        let mut names = Vec::with_capacity(columns.len());
        let mut values = DMatrix::from_element(n_rows, columns.len(), f64::NAN);
        for (j, (name, col)) in columns.into_iter().enumerate() {
            if col.len() != n_rows {
                return Err(ProteoError::DimensionMismatch {
                    expected: n_rows,
                    actual: col.len(),
                });
            }
            for (i, v) in col.into_iter().enumerate() {
                values[(i, j)] = v;
            }
            names.push(name);
        }
        Ok(Self { names, values })
    }

    /// Number of feature rows.
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.names.len()
    }

    /// Column names, in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// A column by name.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|j| self.values.column(j).iter().copied().collect())
    }

    /// Value at (row, column index).
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values[(row, col)]
    }

    /// Join two frames over the same feature index, column-wise.
    ///
    /// Fails when both frames share a column name or when row counts differ.
    pub fn join(&self, other: &ResultFrame) -> Result<ResultFrame> {
        if self.n_rows() != other.n_rows() {
            return Err(ProteoError::DimensionMismatch {
                expected: self.n_rows(),
                actual: other.n_rows(),
            });
        }
        let seen: HashSet<&str> = self.names.iter().map(|s| s.as_str()).collect();
        if let Some(dup) = other.names.iter().find(|n| seen.contains(n.as_str())) {
            return Err(ProteoError::DuplicateColumn(dup.clone()));
        }
        let mut names = self.names.clone();
        names.extend(other.names.iter().cloned());
        let mut values = DMatrix::from_element(self.n_rows(), names.len(), f64::NAN);
        values.view_mut((0, 0), (self.n_rows(), self.n_columns())).copy_from(&self.values);
        values
            .view_mut((0, self.n_columns()), (self.n_rows(), other.n_columns()))
            .copy_from(&other.values);
        Ok(ResultFrame { names, values })
    }
}

/// Terminal artifact of the numeric pipeline: ratio and p-value columns
/// re-attached to feature identity.
#[derive(Debug, Clone)]
pub struct AnnotatedTable {
    accessions: Vec<String>,
    gene_names: Vec<String>,
    frame: ResultFrame,
}

impl AnnotatedTable {
    /// Attach identity columns to a joined frame, anchored on the frame's
    /// rows.
    pub fn new(
        accessions: Vec<String>,
        gene_names: Vec<String>,
        frame: ResultFrame,
    ) -> Result<Self> {
        if accessions.len() != frame.n_rows() || gene_names.len() != frame.n_rows() {
            return Err(ProteoError::DimensionMismatch {
                expected: frame.n_rows(),
                actual: accessions.len().min(gene_names.len()),
            });
        }
        Ok(Self {
            accessions,
            gene_names,
            frame,
        })
    }

    /// Feature accession ids.
    pub fn accessions(&self) -> &[String] {
        &self.accessions
    }

    /// Human-readable feature names.
    pub fn gene_names(&self) -> &[String] {
        &self.gene_names
    }

    /// The numeric frame (ratio and p-value columns).
    pub fn frame(&self) -> &ResultFrame {
        &self.frame
    }

    /// Number of feature rows.
    pub fn n_rows(&self) -> usize {
        self.frame.n_rows()
    }

    /// A numeric column by name, failing with a configuration error when the
    /// column does not exist.
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        self.frame
            .column(name)
            .ok_or_else(|| ProteoError::MissingColumn(name.to_string()))
    }
}
