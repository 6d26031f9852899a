//! Sample-column to group assignment by substring matching.

use crate::data::WideTable;
use crate::error::{ProteoError, Result};
use crate::warnings::{self, Category};
use std::collections::HashMap;

/// Mapping between sample columns and experimental groups.
///
/// Built once per pipeline run by [`map_groups`] and passed explicitly to the
/// downstream engines; no process-wide state is kept.
#[derive(Debug, Clone)]
pub struct GroupAssignment {
    /// Declared group labels, in declaration order.
    groups: Vec<String>,
    /// Matched sample columns, in table order.
    sample_columns: Vec<String>,
    /// Group label for each entry of `sample_columns`.
    column_groups: Vec<String>,
}

impl GroupAssignment {
    /// Declared group labels, in declaration order.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// All matched sample columns, in table order.
    pub fn sample_columns(&self) -> &[String] {
        &self.sample_columns
    }

    /// Group label assigned to a sample column.
    pub fn group_of(&self, column: &str) -> Option<&str> {
        self.sample_columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.column_groups[i].as_str())
    }

    /// Indices into [`Self::sample_columns`] belonging to one group.
    pub fn column_indices(&self, group: &str) -> Vec<usize> {
        self.column_groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.as_str() == group)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of declared groups.
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }
}

/// Derive the group assignment from the wide table's column names.
///
/// A column is assigned to a group when its name contains both the quantity
/// marker and the group name as substrings. When a group name is a substring
/// of a longer declared group name both match, and the later declared group
/// wins; callers are responsible for choosing non-overlapping markers.
///
/// Fails when fewer sample columns match than there are declared groups, or
/// when a declared group matches no column at all. A match count exactly
/// equal to the group count (one sample per group) is suspicious but legal
/// and only logged.
pub fn map_groups(
    table: &WideTable,
    quantity_marker: &str,
    groups: &[String],
) -> Result<GroupAssignment> {
    if groups.is_empty() {
        return Err(ProteoError::InvalidParameter(
            "at least one group must be declared".to_string(),
        ));
    }

    let mut sample_columns = Vec::new();
    let mut column_groups = Vec::new();
    for name in table.column_names() {
        if !name.contains(quantity_marker) {
            continue;
        }
        let mut assigned: Option<&str> = None;
        for group in groups {
            if name.contains(group.as_str()) {
                assigned = Some(group);
            }
        }
        if let Some(group) = assigned {
            sample_columns.push(name.clone());
            column_groups.push(group.to_string());
        }
    }

    if sample_columns.len() < groups.len() {
        return Err(ProteoError::GroupMismatch {
            marker: quantity_marker.to_string(),
            matched: sample_columns.len(),
            declared: groups.len(),
        });
    }
    if sample_columns.len() == groups.len() {
        warnings::advise(
            Category::GroupMatch,
            &format!(
                "marker '{}' matched exactly {} columns for {} groups; one sample per group",
                quantity_marker,
                sample_columns.len(),
                groups.len()
            ),
        );
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for group in &column_groups {
        *counts.entry(group.as_str()).or_insert(0) += 1;
    }
    for group in groups {
        if !counts.contains_key(group.as_str()) {
            return Err(ProteoError::EmptyGroup(group.clone()));
        }
    }

    Ok(GroupAssignment {
        groups: groups.to_vec(),
        sample_columns,
        column_groups,
    })
}
