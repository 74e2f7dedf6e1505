use geo::Point;
use geocontain::{Crs, PointSet};

use crate::error::{Error, Result};
use crate::table::{Relation, Value};

/// A point dataset: one location and one attribute row per point.
#[derive(Debug, Clone)]
pub struct PointLayer {
    points: Vec<Point<f64>>,
    attributes: Relation,
    crs: Crs,
}

impl PointLayer {
    pub fn new(points: Vec<Point<f64>>, attributes: Relation, crs: Crs) -> Result<Self> {
        if points.len() != attributes.len() {
            return Err(Error::Configuration(format!(
                "point layer has {} points but {} attribute rows", points.len(), attributes.len()
            )));
        }
        Ok(Self { points, attributes, crs })
    }

    /// Construct a layer with no attribute columns.
    pub fn from_points(points: Vec<Point<f64>>, crs: Crs) -> Self {
        let attributes = Relation::with_len(points.len());
        Self { points, attributes, crs }
    }

    /// Construct a layer from a table with coordinate columns, dropping rows
    /// whose coordinates are null. The coordinate columns stay in the table.
    pub fn from_relation(relation: &Relation, x: &str, y: &str, crs: Crs) -> Result<Self> {
        let x_col = relation.column_index(x)?;
        let y_col = relation.column_index(y)?;

        let mut keep = Vec::with_capacity(relation.len());
        let mut points = Vec::with_capacity(relation.len());
        for (i, row) in relation.rows().enumerate() {
            let coord = |col: usize, name: &str| match &row[col] {
                Value::Null => Ok(None),
                value => value.as_f64().map(Some).ok_or_else(|| Error::Type {
                    column: name.to_string(),
                    found: value.clone(),
                }),
            };
            if let (Some(px), Some(py)) = (coord(x_col, x)?, coord(y_col, y)?) {
                keep.push(i);
                points.push(Point::new(px, py));
            }
        }

        if keep.len() < relation.len() {
            tracing::warn!(dropped = relation.len() - keep.len(), x, y, "dropped rows without coordinates");
        }
        Self::new(points, relation.take(&keep), crs)
    }

    /// Get the number of points.
    #[inline] pub fn len(&self) -> usize { self.points.len() }

    /// Check if there are no points.
    #[inline] pub fn is_empty(&self) -> bool { self.points.is_empty() }

    #[inline] pub fn points(&self) -> &[Point<f64>] { &self.points }

    #[inline] pub fn attributes(&self) -> &Relation { &self.attributes }

    #[inline] pub fn crs(&self) -> Crs { self.crs }

    /// Borrow the geometry as an engine point set.
    #[inline] pub fn as_set(&self) -> PointSet<'_> { PointSet::new(&self.points, self.crs) }

    /// Keep the points at `indices`, in that order, with their attributes.
    pub fn take(&self, indices: &[usize]) -> Self {
        Self {
            points: indices.iter().map(|&i| self.points[i]).collect(),
            attributes: self.attributes.take(indices),
            crs: self.crs,
        }
    }

    /// Replace the attribute table.
    pub fn with_attributes(&self, attributes: Relation) -> Result<Self> {
        Self::new(self.points.clone(), attributes, self.crs)
    }

    /// Replace the geometry, e.g. with a reprojected copy of itself.
    pub fn with_points(&self, points: Vec<Point<f64>>, crs: Crs) -> Result<Self> {
        Self::new(points, self.attributes.clone(), crs)
    }
}
