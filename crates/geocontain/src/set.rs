use geo::{MultiPolygon, Point};

use crate::crs::Crs;

/// A borrowed, indexed collection of points in a single reference system.
/// Point `j` of the set is column `j` of the intersection matrix.
#[derive(Debug, Clone, Copy)]
pub struct PointSet<'a> {
    points: &'a [Point<f64>],
    crs: Crs,
}

impl<'a> PointSet<'a> {
    pub fn new(points: &'a [Point<f64>], crs: Crs) -> Self {
        Self { points, crs }
    }

    #[inline] pub fn len(&self) -> usize { self.points.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.points.is_empty() }

    #[inline] pub fn points(&self) -> &'a [Point<f64>] { self.points }

    #[inline] pub fn crs(&self) -> Crs { self.crs }
}

/// A borrowed, indexed collection of (multi)polygons in a single reference
/// system. Polygon `i` of the set is row `i` of the intersection matrix.
#[derive(Debug, Clone, Copy)]
pub struct PolygonSet<'a> {
    shapes: &'a [MultiPolygon<f64>],
    crs: Crs,
}

impl<'a> PolygonSet<'a> {
    pub fn new(shapes: &'a [MultiPolygon<f64>], crs: Crs) -> Self {
        Self { shapes, crs }
    }

    #[inline] pub fn len(&self) -> usize { self.shapes.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.shapes.is_empty() }

    #[inline] pub fn shapes(&self) -> &'a [MultiPolygon<f64>] { self.shapes }

    #[inline] pub fn crs(&self) -> Crs { self.crs }
}
