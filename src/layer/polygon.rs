use ahash::AHashMap;
use geo::{BoundingRect, Coord, MultiPolygon, Rect};
use geocontain::{Crs, PolygonSet};

use crate::error::{Error, Result};
use crate::table::{Key, Relation, Value};

/// A named polygon dataset: one geometry and one attribute row per polygon.
///
/// The `name_column` of the attributes is the dataset's join key; every
/// polygon must have a distinct, non-null name.
#[derive(Debug, Clone)]
pub struct PolygonLayer {
    shapes: Vec<MultiPolygon<f64>>,
    attributes: Relation,
    crs: Crs,
    name_column: String,
    name_col: usize,
    index: AHashMap<Key, u32>, // Map between names and polygon indices.
}

impl PolygonLayer {
    pub fn new(shapes: Vec<MultiPolygon<f64>>, attributes: Relation, crs: Crs, name_column: &str) -> Result<Self> {
        if shapes.len() != attributes.len() {
            return Err(Error::Configuration(format!(
                "polygon layer has {} shapes but {} attribute rows", shapes.len(), attributes.len()
            )));
        }

        let name_col = attributes.column_index(name_column)?;
        let mut index = AHashMap::with_capacity(shapes.len());
        for (i, name) in attributes.column_values(name_column)?.enumerate() {
            let key = name.key().ok_or_else(|| Error::Configuration(format!(
                "polygon {i} has a null name in column {name_column:?}"
            )))?;
            if let Some(prev) = index.insert(key, i as u32) {
                return Err(Error::Configuration(format!(
                    "polygons {prev} and {i} share the name {name} in column {name_column:?}"
                )));
            }
        }

        Ok(Self { shapes, attributes, crs, name_column: name_column.to_string(), name_col, index })
    }

    /// Get the number of polygons.
    #[inline] pub fn len(&self) -> usize { self.shapes.len() }

    /// Check if there are no polygons.
    #[inline] pub fn is_empty(&self) -> bool { self.shapes.is_empty() }

    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    #[inline] pub fn attributes(&self) -> &Relation { &self.attributes }

    #[inline] pub fn crs(&self) -> Crs { self.crs }

    #[inline] pub fn name_column(&self) -> &str { &self.name_column }

    /// Get the name of polygon `i`.
    pub fn name(&self, i: usize) -> &Value {
        &self.attributes.row(i)[self.name_col]
    }

    /// Find a polygon by name.
    pub fn find(&self, name: &Key) -> Option<usize> {
        self.index.get(name).map(|&i| i as usize)
    }

    /// Borrow the geometry as an engine polygon set.
    #[inline] pub fn as_set(&self) -> PolygonSet<'_> { PolygonSet::new(&self.shapes, self.crs) }

    /// Replace the attribute table, e.g. with an enriched copy of itself.
    pub fn with_attributes(&self, attributes: Relation) -> Result<Self> {
        Self::new(self.shapes.clone(), attributes, self.crs, &self.name_column)
    }

    /// Replace the geometry, e.g. with a reprojected copy of itself.
    pub fn with_shapes(&self, shapes: Vec<MultiPolygon<f64>>, crs: Crs) -> Result<Self> {
        Self::new(shapes, self.attributes.clone(), crs, &self.name_column)
    }

    /// Compute the bounding rectangle of all polygons.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.shapes.iter()
            .filter_map(|shape| shape.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(x: f64, y: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![(x: x, y: y), (x: x + 1.0, y: y), (x: x + 1.0, y: y + 1.0), (x: x, y: y + 1.0)]])
    }

    fn names(names: &[Value]) -> Relation {
        Relation::from_rows(["name"], names.iter().map(|n| vec![n.clone()]).collect()).unwrap()
    }

    #[test]
    fn index_by_name() {
        let layer = PolygonLayer::new(
            vec![square(0.0, 0.0), square(3.0, 1.0)],
            names(&["Camden".into(), "Barnet".into()]),
            Crs::Epsg(27700),
            "name",
        ).unwrap();

        assert_eq!(layer.len(), 2);
        assert_eq!(layer.find(&Key::from("Barnet")), Some(1));
        assert_eq!(layer.find(&Key::from("Hackney")), None);
        assert_eq!(layer.name(0), &Value::from("Camden"));
        assert_eq!(layer.as_set().crs(), Crs::Epsg(27700));

        let bounds = layer.bounds().unwrap();
        assert_eq!((bounds.min().x, bounds.min().y, bounds.max().x, bounds.max().y), (0.0, 0.0, 4.0, 2.0));
    }

    #[test]
    fn names_must_be_unique_and_present() {
        let dup = PolygonLayer::new(
            vec![square(0.0, 0.0), square(1.0, 0.0)],
            names(&["Camden".into(), "Camden".into()]),
            Crs::Unknown,
            "name",
        );
        assert!(matches!(dup, Err(Error::Configuration(ref msg)) if msg.contains("share the name")));

        let null = PolygonLayer::new(vec![square(0.0, 0.0)], names(&[Value::Null]), Crs::Unknown, "name");
        assert!(matches!(null, Err(Error::Configuration(_))));

        let short = PolygonLayer::new(vec![square(0.0, 0.0)], names(&[]), Crs::Unknown, "name");
        assert!(matches!(short, Err(Error::Configuration(_))));

        let missing = PolygonLayer::new(vec![square(0.0, 0.0)], names(&["x".into()]), Crs::Unknown, "NAME");
        assert!(matches!(missing, Err(Error::Configuration(_))));
    }
}
