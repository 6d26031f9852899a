//! Multiple-testing correction.

pub mod methods;

use crate::error::{ProteoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed enumeration of supported p-value correction methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correction {
    /// No correction; raw p-values pass through.
    None,
    /// Bonferroni single-step correction.
    Bonferroni,
    /// Sidak single-step correction.
    Sidak,
    /// Holm step-down correction.
    Holm,
    /// Hommel closed-testing correction.
    Hommel,
    /// Benjamini-Hochberg false discovery rate.
    FdrBh,
}

impl FromStr for Correction {
    type Err = ProteoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Correction::None),
            "bonferroni" => Ok(Correction::Bonferroni),
            "sidak" => Ok(Correction::Sidak),
            "holm" => Ok(Correction::Holm),
            "hommel" => Ok(Correction::Hommel),
            "fdr_bh" => Ok(Correction::FdrBh),
            other => Err(ProteoError::InvalidCorrection(other.to_string())),
        }
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Correction::None => "none",
            Correction::Bonferroni => "bonferroni",
            Correction::Sidak => "sidak",
            Correction::Holm => "holm",
            Correction::Hommel => "hommel",
            Correction::FdrBh => "fdr_bh",
        };
        write!(f, "{}", name)
    }
}

/// Apply a correction method to one family of p-values.
///
/// Missing p-values enter the correction as 1.0 so they neither shrink nor
/// inflate the other adjusted values, and are restored to NaN in the output.
pub fn correct(p_values: &[f64], method: Correction) -> Vec<f64> {
    if method == Correction::None || p_values.is_empty() {
        return p_values.to_vec();
    }
    let filled: Vec<f64> = p_values
        .iter()
        .map(|&p| if p.is_nan() { 1.0 } else { p })
        .collect();
    let adjusted = match method {
        Correction::None => filled,
        Correction::Bonferroni => methods::bonferroni(&filled),
        Correction::Sidak => methods::sidak(&filled),
        Correction::Holm => methods::holm(&filled),
        Correction::Hommel => methods::hommel(&filled),
        Correction::FdrBh => methods::fdr_bh(&filled),
    };
    adjusted
        .into_iter()
        .zip(p_values)
        .map(|(q, &p)| if p.is_nan() { f64::NAN } else { q })
        .collect()
}
