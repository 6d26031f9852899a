//! Core data structures: tables, frames, and group assignments.

pub mod frame;
pub mod groups;
pub mod table;

pub use frame::{AnnotatedTable, ResultFrame};
pub use groups::{map_groups, GroupAssignment};
pub use table::{pre_filter, IntensityTable, Scale, WideColumn, WideTable, DEFAULT_FILTER_COLUMNS};
