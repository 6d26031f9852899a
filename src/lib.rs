//! Differential Abundance Statistics for Label-Free Proteomics
//!
//! This library computes group-wise statistics over label-free quantification
//! (LFQ) intensity tables and prepares volcano plot annotations with
//! collision-avoided gene labels.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (WideTable, IntensityTable, ResultFrame)
//!   and group mapping
//! - **ratio**: Per-group means and pairwise group ratios
//! - **test**: Pairwise two-sample t-tests
//! - **correct**: Multiple testing correction (Bonferroni, Sidak, Holm,
//!   Hommel, Benjamini-Hochberg)
//! - **plot**: Volcano plot classification and label layout
//! - **pipeline**: Pipeline composition and execution
//! - **warnings**: Scoped advisory suppression
//!
//! # Example
//!
//! ```no_run
//! use proteodiff::prelude::*;
//!
//! # fn load_table() -> WideTable { unimplemented!() }
//! // A wide table with identity, annotation, and "log2 LFQ <group>" columns.
//! let table: WideTable = load_table();
//!
//! let results = Pipeline::new(vec!["KO", "WT"])
//!     .correction(Correction::FdrBh)
//!     .run(&table)
//!     .unwrap();
//!
//! let annotations = Pipeline::new(vec!["KO", "WT"])
//!     .volcano(
//!         &results,
//!         "log2 ratio (KO/WT)",
//!         "-log10 p value (WT/KO)",
//!         &VolcanoParams::default(),
//!     )
//!     .unwrap();
//! ```

pub mod correct;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod plot;
pub mod ratio;
pub mod test;
pub mod warnings;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::correct::{correct, Correction};
    pub use crate::data::{
        map_groups, pre_filter, AnnotatedTable, GroupAssignment, IntensityTable, ResultFrame,
        Scale, WideColumn, WideTable, DEFAULT_FILTER_COLUMNS,
    };
    pub use crate::error::{ProteoError, Result};
    pub use crate::pipeline::{run_differential, Pipeline, PipelineConfig};
    pub use crate::plot::{
        volcano, PlacedLabel, Significance, VolcanoAnnotations, VolcanoParams,
    };
    pub use crate::ratio::{group_means, ratios, GroupMeans, DEFAULT_LOG_CEILING};
    pub use crate::test::{ttest, NanPolicy};
}
