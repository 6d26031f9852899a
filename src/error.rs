//! Error types for the proteodiff library.

use thiserror::Error;

/// Main error type for the library.
///
/// Configuration errors are raised before any computation starts; data errors
/// abort the current pipeline call during computation. No partial output is
/// returned in either case.
#[derive(Error, Debug)]
pub enum ProteoError {
    #[error("Missing column '{0}' in intensity table")]
    MissingColumn(String),

    #[error("Only {matched} sample columns matched marker '{marker}' for {declared} declared groups")]
    GroupMismatch {
        marker: String,
        matched: usize,
        declared: usize,
    },

    #[error("Group '{0}' matched no sample column")]
    EmptyGroup(String),

    #[error("Unknown p-value correction method '{0}' (expected one of: none, bonferroni, sidak, holm, hommel, fdr_bh)")]
    InvalidCorrection(String),

    #[error("Unknown missing-value policy '{0}' (expected one of: omit, propagate, raise)")]
    InvalidNanPolicy(String),

    #[error("Duplicate column '{0}' when joining ratio and p-value tables")]
    DuplicateColumn(String),

    #[error("Intensity {max} exceeds log-scale ceiling {ceiling}; input does not look log2-scaled")]
    ScaleCeiling { max: f64, ceiling: f64 },

    #[error("Missing ratio or p-value for labeled gene '{0}'")]
    MissingLabelValue(String),

    #[error("Genes from highlight list not present in result table: {0:?}")]
    GenesNotFound(Vec<String>),

    #[error("Missing value encountered with nan_policy = raise (feature row {row})")]
    MissingValue { row: usize },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, ProteoError>;
