//! Hypothesis testing for pairwise group comparisons.

pub mod ttest;

pub use ttest::{ttest, NanPolicy};
