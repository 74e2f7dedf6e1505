//! Subcommand implementations.

pub mod clip;
pub mod count;
pub mod join;
pub mod run;

use anyhow::Result;
use geocontain::{Crs, IntersectOptions};

use crate::cli::PointArgs;
use crate::io::{csv::{read_relation, CsvOptions}, fs::has_extension, shp::{read_point_layer, read_polygon_layer}};
use crate::layer::{PointLayer, PolygonLayer};
use crate::proj::{reproject_points, reproject_polygons};

/// Load and optionally reproject the point and polygon layers.
fn load_layers(args: &PointArgs, name_column: &str) -> Result<(PointLayer, PolygonLayer)> {
    let mut polygons = read_polygon_layer(&args.polygons, name_column, args.polygons_epsg.map(Crs::Epsg))?;
    if let Some(target) = args.target_epsg.map(Crs::Epsg) {
        polygons = reproject_polygons(&polygons, target)?;
    }
    Ok((load_points(args)?, polygons))
}

/// Load the point layer from a CSV or shapefile and optionally reproject it.
fn load_points(args: &PointArgs) -> Result<PointLayer> {
    let points = if has_extension(&args.points, "csv") {
        let table = read_relation(&args.points, &CsvOptions::default())?;
        PointLayer::from_relation(&table, &args.x_column, &args.y_column, args.points_epsg.map(Crs::Epsg).unwrap_or_default())?
    } else {
        read_point_layer(&args.points, args.points_epsg.map(Crs::Epsg))?
    };

    match args.target_epsg.map(Crs::Epsg) {
        Some(target) => Ok(reproject_points(&points, target)?),
        None => Ok(points),
    }
}

fn intersect_options(args: &PointArgs) -> IntersectOptions {
    IntersectOptions {
        boundary: args.boundary.into(),
        parallel: !args.serial,
        ..Default::default()
    }
}
