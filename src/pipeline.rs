//! End-to-end workflow: load polygons, count points per polygon, join an
//! external table by polygon name, and write the enriched polygon table.
//!
//! Every stage records what it saw in a [`PipelineReport`], so unmatched keys
//! and points outside all polygons are visible before the final join.

mod config;
mod report;

pub use config::{PipelineConfig, PointSource, PolygonSource, SpatialConfig, TableJoin, TableSource};
pub use report::{PipelineReport, PointReport, TableReport};

use anyhow::Result;
use geocontain::Crs;
use tracing::{info, warn};

use crate::error::Result as JoinResult;
use crate::io::{csv::{read_relation, write_relation}, fs::{ensure_parent_exists, has_extension}, shp::{read_point_layer, read_polygon_layer}};
use crate::layer::{PointLayer, PolygonLayer};
use crate::proj::{reproject_points, reproject_polygons};
use crate::spatial;
use crate::table::{group_aggregate, left_join, reconcile_key, unmatched_keys, DuplicatePolicy, JoinOptions, Relation, Value};

use report::key_labels;

/// Suffix for table columns that collide with polygon attribute names.
const TABLE_SUFFIX: &str = "_table";

/// Run the configured pipeline, writing the output and report if configured.
pub fn run(config: &PipelineConfig) -> Result<(Relation, PipelineReport)> {
    let mut polygons = read_polygon_layer(
        &config.polygons.path,
        &config.polygons.name_column,
        config.polygons.epsg.map(Crs::Epsg),
    )?;
    if let Some(target) = config.target_crs() {
        polygons = reproject_polygons(&polygons, target)?;
    }
    info!(polygons = polygons.len(), crs = %polygons.crs(), "loaded polygons");

    let mut report = PipelineReport { polygons: polygons.len(), ..Default::default() };
    let mut result = polygons.attributes().clone();

    if let Some(source) = &config.points {
        let mut points = load_points(source)?;
        if let Some(target) = config.target_crs() {
            points = reproject_points(&points, target)?;
        }
        info!(points = points.len(), crs = %points.crs(), "loaded points");

        let (counts, point_report) = count_points(&polygons, &points, &config.spatial, &source.count_column)?;
        result = counts;
        report.points = Some(point_report);
    }

    if let Some(source) = &config.table {
        let table = read_relation(&source.path, &source.csv)?;
        info!(rows = table.len(), path = %source.path.display(), "loaded table");

        let (joined, table_report) = join_table(&result, polygons.name_column(), &table, &source.join)?;
        result = joined;
        report.table = Some(table_report);
    }

    report.output_rows = result.len();
    if let Some(output) = &config.output {
        ensure_parent_exists(output)?;
        write_relation(&result, output)?;
        info!(path = %output.display(), rows = result.len(), "wrote enriched polygons");
    }
    if let Some(path) = &config.report {
        ensure_parent_exists(path)?;
        report.write_json(path)?;
    }
    report.log();

    Ok((result, report))
}

fn load_points(source: &PointSource) -> Result<PointLayer> {
    let crs = source.epsg.map(Crs::Epsg);
    if has_extension(&source.path, "csv") {
        let table = read_relation(&source.path, &source.csv)?;
        Ok(PointLayer::from_relation(&table, &source.x_column, &source.y_column, crs.unwrap_or_default())?)
    } else {
        read_point_layer(&source.path, crs)
    }
}

/// Count points per polygon onto the polygon attributes.
pub fn count_points(
    polygons: &PolygonLayer,
    points: &PointLayer,
    spatial: &SpatialConfig,
    count_column: &str,
) -> JoinResult<(Relation, PointReport)> {
    let options = spatial.spatial_options();
    let assignment = spatial::assign(points, polygons, &options.intersect)?;
    let counts = spatial::tally(polygons, &assignment, options.multi_match, count_column)?;

    let counted = counts.column_values(count_column)?
        .map(|count| match count { Value::Int(n) => *n as usize, _ => 0 })
        .sum();
    let report = PointReport {
        points: points.len(),
        clipped: points.len() - assignment.unmatched(),
        outside: assignment.unmatched(),
        multi_matched: assignment.ambiguous().len(),
        counted,
    };
    if report.multi_matched > 0 {
        warn!(points = report.multi_matched, policy = ?options.multi_match, "points inside more than one polygon");
    }
    Ok((counts, report))
}

/// Reconcile a table's names against the polygons, aggregate it per name if
/// a value column is set, and left-join it onto `polygons`.
///
/// Names still unmatched after reconciliation fail the join with
/// [`crate::Error::KeyMismatch`].
pub fn join_table(
    polygons: &Relation,
    name_column: &str,
    table: &Relation,
    join: &TableJoin,
) -> JoinResult<(Relation, TableReport)> {
    let mut table = if join.key == name_column {
        table.clone()
    } else {
        table.rename_column(&join.key, name_column)?
    };

    let unmatched_before = unmatched_keys(polygons, &table, name_column)?;
    if !join.reconcile.is_empty() {
        table = reconcile_key(&table, name_column, join.reconcile.iter().map(|(old, new)| (old.as_str(), new.as_str())))?;
    }
    let unmatched_after = unmatched_keys(polygons, &table, name_column)?;
    if !unmatched_after.is_empty() {
        warn!(keys = ?key_labels(&unmatched_after), "table keys without a polygon");
    }

    let (right, duplicates) = match &join.value {
        Some(value) => {
            // The key column was renamed above.
            let value = if *value == join.key { name_column } else { value.as_str() };
            (group_aggregate(&table, name_column, value, join.aggregate)?, DuplicatePolicy::Error)
        }
        None => (table.clone(), join.duplicates),
    };

    let report = TableReport {
        rows: table.len(),
        unmatched_before: key_labels(&unmatched_before),
        unmatched_after: key_labels(&unmatched_after),
        groups: right.len(),
    };

    let options = JoinOptions { duplicates, strict_keys: true, suffix: Some(TABLE_SUFFIX.into()) };
    let joined = left_join(polygons, &right, name_column, &options)?;
    Ok((joined, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::table::Aggregate;
    use std::collections::BTreeMap;

    fn boroughs() -> Relation {
        Relation::from_rows(["NAME", "GSS_CODE"], vec![
            vec!["City of London".into(), "E09000001".into()],
            vec!["Westminster".into(), "E09000033".into()],
            vec!["Camden".into(), "E09000007".into()],
        ]).unwrap()
    }

    fn crimes() -> Relation {
        Relation::from_rows(["Borough", "Count"], vec![
            vec!["Westminster".into(), Value::Int(10)],
            vec!["Corp of London".into(), Value::Int(4)],
            vec!["Westminster".into(), Value::Int(5)],
            vec!["Corp of London".into(), Value::Int(1)],
        ]).unwrap()
    }

    fn crime_join() -> TableJoin {
        TableJoin {
            key: "Borough".into(),
            value: Some("Count".into()),
            aggregate: Aggregate::Sum,
            reconcile: BTreeMap::new(),
            duplicates: DuplicatePolicy::Error,
        }
    }

    #[test]
    fn unreconciled_names_fail_the_join() {
        let err = join_table(&boroughs(), "NAME", &crimes(), &crime_join()).unwrap_err();
        assert!(matches!(err, Error::KeyMismatch { ref keys, .. } if keys.len() == 1));
    }

    #[test]
    fn reconciled_names_join_with_sums() {
        let mut join = crime_join();
        join.reconcile.insert("Corp of London".into(), "City of London".into());

        let (joined, report) = join_table(&boroughs(), "NAME", &crimes(), &join).unwrap();
        assert_eq!(report.unmatched_before, vec!["Corp of London".to_string()]);
        assert!(report.unmatched_after.is_empty());
        assert_eq!((report.rows, report.groups), (4, 2));

        assert_eq!(joined.columns(), &["NAME", "GSS_CODE", "Count"]);
        assert_eq!(joined.get(0, "Count"), Some(&Value::Int(5)));
        assert_eq!(joined.get(1, "Count"), Some(&Value::Int(15)));
        assert_eq!(joined.get(2, "Count"), Some(&Value::Null));
    }

    #[test]
    fn rows_per_name_can_be_counted() {
        let mut join = crime_join();
        join.value = Some("Borough".into());
        join.aggregate = Aggregate::Count;
        join.reconcile.insert("Corp of London".into(), "City of London".into());

        let (joined, _) = join_table(&boroughs(), "NAME", &crimes(), &join).unwrap();
        assert_eq!(joined.columns(), &["NAME", "GSS_CODE", "NAME_count"]);
        assert_eq!(joined.get(0, "NAME_count"), Some(&Value::Int(2)));
        assert_eq!(joined.get(2, "NAME_count"), Some(&Value::Null));
    }

    #[test]
    fn raw_tables_follow_the_duplicate_policy() {
        let mut join = crime_join();
        join.value = None;
        join.reconcile.insert("Corp of London".into(), "City of London".into());
        assert!(matches!(
            join_table(&boroughs(), "NAME", &crimes(), &join),
            Err(Error::AmbiguousJoin { .. })
        ));

        join.duplicates = DuplicatePolicy::First;
        let (joined, _) = join_table(&boroughs(), "NAME", &crimes(), &join).unwrap();
        assert_eq!(joined.get(1, "Count"), Some(&Value::Int(10)));
    }
}
