//! Spatial operations over layers: containment, clipping and spatial joins.

use geocontain::{Assignment, IntersectOptions, IntersectionMatrix, MultiMatch, PolygonSet};
use tracing::info;

use crate::error::Result;
use crate::layer::{PointLayer, PolygonLayer};
use crate::table::{group_aggregate, left_join, Aggregate, JoinOptions, Relation, Value};

/// Options for [`spatial_join`] and [`count_points`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpatialOptions {
    pub intersect: IntersectOptions,
    pub multi_match: MultiMatch,
}

/// Compute the polygon × point containment matrix of two layers.
pub fn intersects(points: &PointLayer, polygons: &PolygonLayer, options: &IntersectOptions) -> Result<IntersectionMatrix> {
    Ok(geocontain::intersects(&points.as_set(), &polygons.as_set(), options)?)
}

/// The points contained by at least one polygon, in input order.
pub fn clip(points: &PointLayer, polygons: &PolygonLayer, options: &IntersectOptions) -> Result<PointLayer> {
    clip_to_shapes(points, &polygons.as_set(), options)
}

/// As [`clip`], against bare polygon geometries with no attributes.
pub fn clip_to_shapes(points: &PointLayer, polygons: &PolygonSet, options: &IntersectOptions) -> Result<PointLayer> {
    let keep = geocontain::clip(&points.as_set(), polygons, options)?;
    info!(points = points.len(), kept = keep.len(), "clipped points to polygons");
    Ok(points.take(&keep))
}

/// Containing polygons of every point.
pub fn assign(points: &PointLayer, polygons: &PolygonLayer, options: &IntersectOptions) -> Result<Assignment> {
    Ok(geocontain::assign(&points.as_set(), &polygons.as_set(), options)?)
}

/// Append the name of the containing polygon to every point's attributes.
///
/// Points outside every polygon get a null name. Under [`MultiMatch::All`] a
/// point inside several polygons is repeated once per polygon.
pub fn spatial_join(points: &PointLayer, polygons: &PolygonLayer, options: &SpatialOptions) -> Result<Relation> {
    let assignment = assign(points, polygons, &options.intersect)?;
    let mut pairs = assignment.pairs(options.multi_match)?.into_iter().peekable();

    let mut indices = Vec::with_capacity(points.len());
    let mut names = Vec::with_capacity(points.len());
    for point in 0..points.len() {
        let before = indices.len();
        while let Some((_, polygon)) = pairs.next_if(|&(p, _)| p == point) {
            indices.push(point);
            names.push(polygons.name(polygon as usize).clone());
        }
        if indices.len() == before {
            indices.push(point);
            names.push(Value::Null);
        }
    }

    info!(
        points = points.len(),
        rows = indices.len(),
        unmatched = assignment.unmatched(),
        "spatially joined points to polygons"
    );
    points.attributes().take(&indices).with_column(polygons.name_column(), names)
}

/// Count the points inside each polygon and append the counts to the
/// polygon attributes as `count_column`. The result has exactly one row per
/// polygon, in polygon order; polygons without points count zero.
pub fn count_points(
    points: &PointLayer,
    polygons: &PolygonLayer,
    options: &SpatialOptions,
    count_column: &str,
) -> Result<Relation> {
    let assignment = assign(points, polygons, &options.intersect)?;
    tally(polygons, &assignment, options.multi_match, count_column)
}

/// Turn an existing assignment into per-polygon counts, as [`count_points`].
pub fn tally(polygons: &PolygonLayer, assignment: &Assignment, multi_match: MultiMatch, count_column: &str) -> Result<Relation> {
    let name_column = polygons.name_column();
    let matched = Relation::from_rows(
        [name_column, count_column],
        assignment.pairs(multi_match)?.into_iter()
            .map(|(point, polygon)| vec![polygons.name(polygon as usize).clone(), Value::Int(point as i64)])
            .collect(),
    )?;

    let counts = group_aggregate(&matched, name_column, count_column, Aggregate::Count)?;
    let joined = left_join(polygons.attributes(), &counts, name_column, &JoinOptions::default())?;

    info!(
        polygons = polygons.len(),
        matched = matched.len(),
        unmatched = assignment.unmatched(),
        ambiguous = assignment.ambiguous().len(),
        "counted points per polygon"
    );
    joined.fill_null(count_column, Value::Int(0))
}
