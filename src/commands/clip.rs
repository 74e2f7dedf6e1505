use anyhow::Result;
use geocontain::{Crs, PolygonSet};
use tracing::info;

use crate::cli::{Cli, ClipArgs};
use crate::io::{csv::write_relation, fs::ensure_parent_exists, shp::read_polygon_shapes};
use crate::proj::reproject_shapes;
use crate::spatial;

pub fn run(_cli: &Cli, args: &ClipArgs) -> Result<()> {
    let input = &args.input;
    let points = super::load_points(input)?;
    let (mut shapes, mut crs) = read_polygon_shapes(&input.polygons, input.polygons_epsg.map(Crs::Epsg))?;
    if let Some(target) = input.target_epsg.map(Crs::Epsg) {
        shapes = reproject_shapes(&shapes, crs, target)?;
        crs = target;
    }

    let clipped = spatial::clip_to_shapes(&points, &PolygonSet::new(&shapes, crs), &super::intersect_options(input))?;

    // Coordinates are written from the (possibly reprojected) points, over
    // any columns of the same name.
    let table = clipped.attributes()
        .set_column(&input.x_column, clipped.points().iter().map(|p| p.x().into()).collect())?
        .set_column(&input.y_column, clipped.points().iter().map(|p| p.y().into()).collect())?;

    ensure_parent_exists(&args.output)?;
    write_relation(&table, &args.output)?;
    info!(kept = clipped.len(), of = points.len(), output = %args.output.display(), "clip");
    Ok(())
}
