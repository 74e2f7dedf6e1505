//! Readers and writers for the formats the joins consume and produce.
//!
//! - `csv` - delimited tables, via polars
//! - `frame` - conversion between polars DataFrames and relations
//! - `shp` - ESRI shapefiles (optionally zipped) as point or polygon layers
//! - `fs` - archive extraction and directory helpers

pub mod csv;
pub mod frame;
pub mod fs;
pub mod shp;
