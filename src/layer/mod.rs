//! Geometry paired with attribute tables.

mod point;
mod polygon;

pub use point::PointLayer;
pub use polygon::PolygonLayer;
