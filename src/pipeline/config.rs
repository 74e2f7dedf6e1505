use std::{collections::BTreeMap, fs, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use geocontain::{BoundaryPolicy, Crs, IndexKind, IntersectOptions, MultiMatch};
use serde::{Deserialize, Serialize};

use crate::io::csv::CsvOptions;
use crate::spatial::SpatialOptions;
use crate::table::{Aggregate, DuplicatePolicy};

#[derive(Deserialize, Serialize)]
#[serde(remote = "BoundaryPolicy", rename_all = "snake_case")]
enum BoundaryPolicyDef { Inclusive, Exclusive }

#[derive(Deserialize, Serialize)]
#[serde(remote = "MultiMatch", rename_all = "snake_case")]
enum MultiMatchDef { First, All, Error }

#[derive(Deserialize, Serialize)]
#[serde(remote = "IndexKind", rename_all = "snake_case")]
enum IndexKindDef {
    BruteForce,
    #[serde(rename = "rtree")]
    RTree,
}

/// A complete spatial and attribute join, as read from a JSON file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub polygons: PolygonSource,

    /// Points counted per polygon.
    #[serde(default)]
    pub points: Option<PointSource>,

    /// Table aggregated per polygon name and joined onto the polygons.
    #[serde(default)]
    pub table: Option<TableSource>,

    /// Reproject both layers into this CRS before intersecting.
    #[serde(default)]
    pub target_epsg: Option<u32>,

    #[serde(default)]
    pub spatial: SpatialConfig,

    /// Where to write the enriched polygon table.
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Where to write the inspection report as JSON.
    #[serde(default)]
    pub report: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolygonSource {
    /// A `.shp` or a `.zip` holding one.
    pub path: PathBuf,
    pub name_column: String,
    /// Overrides the CRS read from the `.prj`.
    #[serde(default)]
    pub epsg: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointSource {
    /// A `.shp`, a `.zip` holding one, or a `.csv` with coordinate columns.
    pub path: PathBuf,
    #[serde(default)]
    pub epsg: Option<u32>,
    #[serde(default = "default_x")]
    pub x_column: String,
    #[serde(default = "default_y")]
    pub y_column: String,
    #[serde(default)]
    pub csv: CsvOptions,
    /// Name of the per-polygon count column.
    #[serde(default = "default_count")]
    pub count_column: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSource {
    pub path: PathBuf,
    #[serde(default)]
    pub csv: CsvOptions,
    #[serde(flatten)]
    pub join: TableJoin,
}

/// How a table is matched to polygon names and joined onto the polygons.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableJoin {
    /// Column holding polygon names.
    pub key: String,
    /// Column to aggregate per name; without one the table is joined as is.
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default = "default_aggregate")]
    pub aggregate: Aggregate,
    /// Corrections from table names to polygon names.
    #[serde(default)]
    pub reconcile: BTreeMap<String, String>,
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpatialConfig {
    #[serde(with = "BoundaryPolicyDef")]
    pub boundary: BoundaryPolicy,
    #[serde(with = "MultiMatchDef")]
    pub multi_match: MultiMatch,
    #[serde(with = "IndexKindDef")]
    pub index: IndexKind,
    pub parallel: bool,
    pub validate: bool,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            boundary: BoundaryPolicy::default(),
            multi_match: MultiMatch::default(),
            index: IndexKind::default(),
            parallel: true,
            validate: true,
        }
    }
}

impl SpatialConfig {
    pub fn intersect_options(&self) -> IntersectOptions {
        IntersectOptions {
            boundary: self.boundary,
            index: self.index,
            parallel: self.parallel,
            validate: self.validate,
        }
    }

    pub fn spatial_options(&self) -> SpatialOptions {
        SpatialOptions { intersect: self.intersect_options(), multi_match: self.multi_match }
    }
}

fn default_x() -> String { "x".into() }
fn default_y() -> String { "y".into() }
fn default_count() -> String { "count".into() }
fn default_aggregate() -> Aggregate { Aggregate::Sum }

impl PipelineConfig {
    /// Read a config from a JSON file. Relative paths inside it are resolved
    /// against the file's directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("[pipeline::config] Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("[pipeline::config] Invalid config {}", path.display()))?;
        Ok(config.relative_to(path.parent().unwrap_or(Path::new("."))))
    }

    /// Resolve relative paths against `base`.
    pub fn relative_to(mut self, base: &Path) -> Self {
        let resolve = |path: &mut PathBuf| if path.is_relative() { *path = base.join(&*path) };
        resolve(&mut self.polygons.path);
        if let Some(points) = &mut self.points { resolve(&mut points.path) }
        if let Some(table) = &mut self.table { resolve(&mut table.path) }
        if let Some(output) = &mut self.output { resolve(output) }
        if let Some(report) = &mut self.report { resolve(report) }
        self
    }

    pub fn target_crs(&self) -> Option<Crs> {
        self.target_epsg.map(Crs::Epsg)
    }
}
