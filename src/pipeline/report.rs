use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::table::Key;

/// Intermediate results of a pipeline run, recorded between stages.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub polygons: usize,
    pub points: Option<PointReport>,
    pub table: Option<TableReport>,
    /// Rows in the final enriched polygon table.
    pub output_rows: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PointReport {
    pub points: usize,
    /// Points inside at least one polygon.
    pub clipped: usize,
    /// Points outside every polygon.
    pub outside: usize,
    /// Points inside more than one polygon.
    pub multi_matched: usize,
    /// Sum of the per-polygon counts.
    pub counted: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub rows: usize,
    /// Table keys with no polygon, before and after reconciliation.
    pub unmatched_before: Vec<String>,
    pub unmatched_after: Vec<String>,
    /// Rows after aggregation, one per distinct key.
    pub groups: usize,
}

pub(crate) fn key_labels(keys: &[Key]) -> Vec<String> {
    keys.iter().map(ToString::to_string).collect()
}

impl PipelineReport {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("[pipeline::report] Failed to serialize report")?;
        fs::write(path, json)
            .with_context(|| format!("[pipeline::report] Failed to write report to {}", path.display()))
    }

    /// Log a one-line summary per stage.
    pub fn log(&self) {
        info!(polygons = self.polygons, output_rows = self.output_rows, "pipeline finished");
        if let Some(points) = &self.points {
            info!(
                points = points.points,
                clipped = points.clipped,
                outside = points.outside,
                multi_matched = points.multi_matched,
                counted = points.counted,
                "point stage"
            );
        }
        if let Some(table) = &self.table {
            info!(
                rows = table.rows,
                groups = table.groups,
                unmatched_before = table.unmatched_before.len(),
                unmatched_after = table.unmatched_after.len(),
                "table stage"
            );
        }
    }
}
