use rayon::prelude::*;
use tracing::debug;

use crate::error::IntersectError;
use crate::index::{BruteForce, CandidateIndex, RTreeIndex};
use crate::matrix::{Assignment, IntersectionMatrix, PolygonHits};
use crate::predicate::{locate, BoundaryPolicy};
use crate::set::{PointSet, PolygonSet};
use crate::validate::validate_polygons;

/// Which candidate pre-filter [`intersects`] builds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// Test every polygon against every point.
    BruteForce,
    /// Test only polygons whose bounding box contains the point.
    #[default]
    RTree,
}

/// Options for [`intersects`], [`clip`] and [`assign`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntersectOptions {
    pub boundary: BoundaryPolicy,
    pub index: IndexKind,
    /// Evaluate points on the rayon thread pool.
    pub parallel: bool,
    /// Reject degenerate or self-intersecting rings before testing.
    pub validate: bool,
}

impl Default for IntersectOptions {
    fn default() -> Self {
        Self {
            boundary: BoundaryPolicy::default(),
            index: IndexKind::default(),
            parallel: true,
            validate: true,
        }
    }
}

/// Compute the polygon × point containment matrix.
pub fn intersects(points: &PointSet, polygons: &PolygonSet, options: &IntersectOptions)
    -> Result<IntersectionMatrix, IntersectError>
{
    match options.index {
        IndexKind::BruteForce => intersects_with(points, polygons, &BruteForce::new(polygons.shapes()), options),
        IndexKind::RTree => intersects_with(points, polygons, &RTreeIndex::new(polygons.shapes()), options),
    }
}

/// Compute the containment matrix using a caller-supplied candidate index.
/// `options.index` is ignored.
pub fn intersects_with<I: CandidateIndex>(
    points: &PointSet,
    polygons: &PolygonSet,
    index: &I,
    options: &IntersectOptions,
) -> Result<IntersectionMatrix, IntersectError> {
    if points.crs() != polygons.crs() {
        return Err(IntersectError::CrsMismatch { points: points.crs(), polygons: polygons.crs() });
    }
    if options.validate {
        validate_polygons(polygons.shapes())?;
    }

    let shapes = polygons.shapes();
    let boundary = options.boundary;
    let column = |candidates: &mut Vec<usize>, point: &geo::Point<f64>| -> PolygonHits {
        index.candidates(point.0, candidates);
        candidates.iter()
            .filter(|&&i| boundary.contains(locate(point.0, &shapes[i])))
            .map(|&i| i as u32)
            .collect()
    };

    let columns: Vec<PolygonHits> = if options.parallel {
        points.points().par_iter().map_init(Vec::new, column).collect()
    } else {
        let mut candidates = Vec::new();
        points.points().iter().map(|point| column(&mut candidates, point)).collect()
    };

    let matrix = IntersectionMatrix::from_columns(polygons.len(), &columns);
    debug!(
        points = points.len(),
        polygons = polygons.len(),
        hits = matrix.nnz(),
        crs = %points.crs(),
        "computed intersection matrix"
    );
    Ok(matrix)
}

/// Indices of the points contained by at least one polygon, in input order.
pub fn clip(points: &PointSet, polygons: &PolygonSet, options: &IntersectOptions)
    -> Result<Vec<usize>, IntersectError>
{
    Ok(intersects(points, polygons, options)?.clipped())
}

/// Containing polygons of every point.
pub fn assign(points: &PointSet, polygons: &PolygonSet, options: &IntersectOptions)
    -> Result<Assignment, IntersectError>
{
    Ok(intersects(points, polygons, options)?.assignment())
}
