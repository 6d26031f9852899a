//! Pipeline runner: group mapping, means, ratios, tests, annotation.

use crate::correct::Correction;
use crate::data::{
    map_groups, pre_filter, AnnotatedTable, IntensityTable, Scale, WideTable,
    DEFAULT_FILTER_COLUMNS,
};
use crate::error::{ProteoError, Result};
use crate::plot::{self, VolcanoAnnotations, VolcanoParams};
use crate::ratio::{group_means, ratios, DEFAULT_LOG_CEILING};
use crate::test::{ttest, NanPolicy};
use serde::{Deserialize, Serialize};

/// Full configuration for one differential abundance run.
///
/// Serializes to YAML so an analysis can be stored next to its results and
/// replayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Substring identifying quantitative sample columns.
    pub quantity_marker: String,
    /// Declared experimental groups. Sample columns are assigned by
    /// substring match against these names.
    pub groups: Vec<String>,
    /// Column holding feature accession ids.
    pub col_accession: String,
    /// Column holding human-readable feature names.
    pub col_gene: String,
    /// Drop rows flagged in the annotation marker columns.
    pub pre_filter: bool,
    /// Annotation marker columns consulted by the row filter.
    pub filter_columns: Vec<String>,
    /// Scale of the input sample columns.
    pub input_scale: Scale,
    /// Reject claimed-log2 input with intensities above this.
    pub log_ceiling: f64,
    /// Multiple-testing correction applied per comparison direction.
    pub correction: Correction,
    /// Missing-value handling inside each pairwise test.
    pub nan_policy: NanPolicy,
    /// Emit -log10 p-values instead of plain corrected p-values.
    pub log10_p: bool,
    /// Emit log2 ratios instead of linear quotients.
    pub log2_ratio: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            quantity_marker: "log2 LFQ".to_string(),
            groups: Vec::new(),
            col_accession: "Protein ID".to_string(),
            col_gene: "Gene Names".to_string(),
            pre_filter: true,
            filter_columns: DEFAULT_FILTER_COLUMNS.iter().map(|s| s.to_string()).collect(),
            input_scale: Scale::Log2,
            log_ceiling: DEFAULT_LOG_CEILING,
            correction: Correction::FdrBh,
            nan_policy: NanPolicy::Omit,
            log10_p: true,
            log2_ratio: true,
        }
    }
}

impl PipelineConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(ProteoError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(ProteoError::from)
    }
}

/// Builder for configuring and running the differential abundance pipeline.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline for the given experimental groups, with default
    /// settings for everything else.
    pub fn new<S: Into<String>>(groups: Vec<S>) -> Self {
        Self {
            config: PipelineConfig {
                groups: groups.into_iter().map(Into::into).collect(),
                ..PipelineConfig::default()
            },
        }
    }

    /// Create from a config.
    pub fn from_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The current configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Set the quantity marker used to detect sample columns.
    pub fn quantity_marker(mut self, marker: &str) -> Self {
        self.config.quantity_marker = marker.to_string();
        self
    }

    /// Set the identity columns (accession, gene name).
    pub fn identity_columns(mut self, accession: &str, gene: &str) -> Self {
        self.config.col_accession = accession.to_string();
        self.config.col_gene = gene.to_string();
        self
    }

    /// Enable or disable the annotation row filter.
    pub fn pre_filter(mut self, enabled: bool) -> Self {
        self.config.pre_filter = enabled;
        self
    }

    /// Override the annotation marker columns.
    pub fn filter_columns(mut self, columns: Vec<String>) -> Self {
        self.config.filter_columns = columns;
        self
    }

    /// Declare the scale of the input sample columns.
    pub fn input_scale(mut self, scale: Scale) -> Self {
        self.config.input_scale = scale;
        self
    }

    /// Set the multiple-testing correction.
    pub fn correction(mut self, method: Correction) -> Self {
        self.config.correction = method;
        self
    }

    /// Set the missing-value policy for pairwise tests.
    pub fn nan_policy(mut self, policy: NanPolicy) -> Self {
        self.config.nan_policy = policy;
        self
    }

    /// Emit -log10 p-values (default) or plain corrected p-values.
    pub fn log10_p(mut self, enabled: bool) -> Self {
        self.config.log10_p = enabled;
        self
    }

    /// Emit log2 ratios (default) or linear quotients.
    pub fn log2_ratio(mut self, enabled: bool) -> Self {
        self.config.log2_ratio = enabled;
        self
    }

    /// Run the pipeline on a wide input table.
    ///
    /// Stages run in fixed order: row filtering, group mapping, extraction,
    /// group means, pairwise ratios, pairwise tests, and the final join back
    /// onto feature identity. The input is never mutated; any stage failure
    /// aborts the run with no partial output.
    pub fn run(&self, table: &WideTable) -> Result<AnnotatedTable> {
        let cfg = &self.config;

        // Identity columns are checked up front so a typo in the config
        // fails before any numeric work.
        table.text_column(&cfg.col_accession)?;
        table.text_column(&cfg.col_gene)?;

        let filtered;
        let table = if cfg.pre_filter {
            let names: Vec<&str> = cfg.filter_columns.iter().map(|s| s.as_str()).collect();
            filtered = pre_filter(table, &names);
            &filtered
        } else {
            table
        };

        let assignment = map_groups(table, &cfg.quantity_marker, &cfg.groups)
            .map_err(|e| stage_error("group mapping", e))?;

        let intensities = IntensityTable::from_wide(
            table,
            &cfg.col_accession,
            &cfg.col_gene,
            assignment.sample_columns(),
            cfg.input_scale,
        )?;

        let means = group_means(&intensities, &assignment, cfg.log_ceiling)
            .map_err(|e| stage_error("group means", e))?;
        let ratio_scale = if cfg.log2_ratio { Scale::Log2 } else { Scale::Linear };
        let ratio_frame =
            ratios(&means, ratio_scale).map_err(|e| stage_error("ratios", e))?;

        // Zeros are non-detections; mask them before testing so a group of
        // zeros reads as too few observations instead of a constant sample.
        let log_intensities = intensities.mask_nondetections().to_log2();
        let p_frame = ttest(
            &log_intensities,
            &assignment,
            cfg.correction,
            cfg.nan_policy,
            cfg.log10_p,
        )
        .map_err(|e| stage_error("t-test", e))?;

        let joined = ratio_frame.join(&p_frame).map_err(|e| stage_error("join", e))?;
        AnnotatedTable::new(
            intensities.accessions().to_vec(),
            intensities.gene_names().to_vec(),
            joined,
        )
    }

    /// Classify and lay out volcano plot annotations for one result table.
    pub fn volcano(
        &self,
        table: &AnnotatedTable,
        col_ratio: &str,
        col_pval: &str,
        params: &VolcanoParams,
    ) -> Result<VolcanoAnnotations> {
        plot::volcano(table, col_ratio, col_pval, params)
    }
}

fn stage_error(stage: &str, e: ProteoError) -> ProteoError {
    match e {
        // Configuration errors keep their own message.
        e @ (ProteoError::MissingColumn(_)
        | ProteoError::GroupMismatch { .. }
        | ProteoError::EmptyGroup(_)
        | ProteoError::ScaleCeiling { .. }) => e,
        other => ProteoError::Pipeline(format!("{} failed: {}", stage, other)),
    }
}

/// Convenience function: run a default-configured analysis for the given
/// groups.
pub fn run_differential(table: &WideTable, groups: Vec<String>) -> Result<AnnotatedTable> {
    Pipeline::new(groups).run(table)
}
