//! Reprojection of layers between the supported EPSG coordinate systems.

use geo::{Coord, MapCoords, MultiPolygon, Point};
use geocontain::Crs;
use proj4rs::{proj::Proj as Proj4, transform::transform};
use tracing::debug;

use crate::error::{Error, Result};
use crate::layer::{PointLayer, PolygonLayer};

/// Geographic EPSG codes, whose coordinates are degrees of longitude and latitude.
fn is_geographic(epsg: u32) -> bool {
    matches!(epsg, 4326 | 4269)
}

/// PROJ.4 string for a supported EPSG code.
pub fn proj4_definition(epsg: u32) -> Result<String> {
    Ok(match epsg {
        4326 => "+proj=longlat +datum=WGS84 +no_defs +type=crs".into(),
        4269 => "+proj=longlat +datum=NAD83 +no_defs +type=crs".into(),
        27700 => concat!(
            "+proj=tmerc +lat_0=49 +lon_0=-2 +k=0.9996012717 +x_0=400000 +y_0=-100000 +ellps=airy ",
            "+towgs84=446.448,-125.157,542.06,0.15,0.247,0.842,-20.489 +units=m +no_defs +type=crs",
        ).into(),
        3857 => "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs +type=crs".into(),
        32601..=32660 => format!("+proj=utm +zone={} +datum=WGS84 +units=m +no_defs +type=crs", epsg - 32600),
        32701..=32760 => format!("+proj=utm +zone={} +south +datum=WGS84 +units=m +no_defs +type=crs", epsg - 32700),
        _ => return Err(Error::Configuration(format!("unsupported CRS EPSG:{epsg}"))),
    })
}

/// A coordinate transformation between two EPSG coordinate systems.
pub struct Transformer {
    from: Proj4,
    to: Proj4,
    from_geographic: bool,
    to_geographic: bool,
}

impl Transformer {
    pub fn new(from: Crs, to: Crs) -> Result<Self> {
        let (Some(from_epsg), Some(to_epsg)) = (from.epsg(), to.epsg()) else {
            return Err(Error::Configuration(format!("cannot reproject from {from} to {to}")));
        };

        let build = |epsg: u32| -> Result<Proj4> {
            let proj_string = proj4_definition(epsg)?;
            Proj4::from_proj_string(&proj_string)
                .map_err(|e| Error::Projection(format!("failed to build PROJ.4 {proj_string}: {e}")))
        };

        Ok(Self {
            from: build(from_epsg)?,
            to: build(to_epsg)?,
            from_geographic: is_geographic(from_epsg),
            to_geographic: is_geographic(to_epsg),
        })
    }

    /// Transform a single coordinate. Geographic coordinates are in degrees.
    pub fn transform(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let mut point = if self.from_geographic {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };
        transform(&self.from, &self.to, &mut point)
            .map_err(|e| Error::Projection(format!("failed to transform ({}, {}): {e}", coord.x, coord.y)))?;

        Ok(if self.to_geographic {
            Coord { x: point.0.to_degrees(), y: point.1.to_degrees() }
        } else {
            Coord { x: point.0, y: point.1 }
        })
    }
}

/// Reproject a point layer into `target`. A layer already in `target` is
/// returned unchanged.
pub fn reproject_points(layer: &PointLayer, target: Crs) -> Result<PointLayer> {
    if layer.crs() == target {
        return Ok(layer.clone());
    }
    let transformer = Transformer::new(layer.crs(), target)?;
    let points = layer.points().iter()
        .map(|point| transformer.transform(point.0).map(Point))
        .collect::<Result<Vec<_>>>()?;

    debug!(from = %layer.crs(), to = %target, points = points.len(), "reprojected points");
    layer.with_points(points, target)
}

/// Reproject a polygon layer into `target`. A layer already in `target` is
/// returned unchanged.
pub fn reproject_polygons(layer: &PolygonLayer, target: Crs) -> Result<PolygonLayer> {
    if layer.crs() == target {
        return Ok(layer.clone());
    }
    let shapes = reproject_shapes(layer.shapes(), layer.crs(), target)?;
    layer.with_shapes(shapes, target)
}

/// Reproject bare polygon geometries from `from` into `to`.
pub fn reproject_shapes(shapes: &[MultiPolygon<f64>], from: Crs, to: Crs) -> Result<Vec<MultiPolygon<f64>>> {
    if from == to {
        return Ok(shapes.to_vec());
    }
    let transformer = Transformer::new(from, to)?;
    let shapes = shapes.iter()
        .map(|shape| shape.try_map_coords(|coord| transformer.transform(coord)))
        .collect::<Result<Vec<_>>>()?;

    debug!(%from, %to, polygons = shapes.len(), "reprojected polygons");
    Ok(shapes)
}
