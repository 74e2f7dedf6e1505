//! Shapefile reading for point and polygon layers.

use std::{fs, path::Path, sync::LazyLock};

use anyhow::{Context, Result, bail};
use geo::{Coord, LineString, MultiPolygon, Point, Polygon};
use geocontain::Crs;
use regex::Regex;
use shapefile::{dbase::{self, FieldValue, Record}, PolygonRing, Reader, Shape};
use tracing::{debug, warn};

use crate::io::fs::{extract_zip, find_with_extension, has_extension};
use crate::layer::{PointLayer, PolygonLayer};
use crate::table::{Relation, Value};

/// Reads a polygon layer from a `.shp` (or a `.zip` holding one).
///
/// The CRS is `crs` if given, else detected from the sibling `.prj`, else
/// unknown.
pub fn read_polygon_layer(path: &Path, name_column: &str, crs: Option<Crs>) -> Result<PolygonLayer> {
    with_shapefile(path, |shp_path| {
        let (shapes, attributes, crs) = read_polygons(shp_path, crs)?;
        PolygonLayer::new(shapes, attributes, crs, name_column)
            .with_context(|| format!("[io::shp] Invalid polygon layer {}", shp_path.display()))
    })
}

/// Reads only the polygon geometries and their CRS, for operations that
/// never look at attributes.
pub fn read_polygon_shapes(path: &Path, crs: Option<Crs>) -> Result<(Vec<MultiPolygon<f64>>, Crs)> {
    with_shapefile(path, |shp_path| {
        let (shapes, _, crs) = read_polygons(shp_path, crs)?;
        Ok((shapes, crs))
    })
}

fn read_polygons(shp_path: &Path, crs: Option<Crs>) -> Result<(Vec<MultiPolygon<f64>>, Relation, Crs)> {
    let (shapes, attributes) = read_shapefile(shp_path)?;
    let shapes = shapes.iter()
        .enumerate()
        .map(|(i, shape)| shape_to_multipolygon(shape)
            .with_context(|| format!("[io::shp] Record {i} of {} is not a polygon", shp_path.display())))
        .collect::<Result<Vec<_>>>()?;

    let crs = crs.unwrap_or_else(|| detect_crs(shp_path));
    debug!(path = %shp_path.display(), polygons = shapes.len(), %crs, "read polygon shapefile");
    Ok((shapes, attributes, crs))
}

/// Reads a point layer from a `.shp` (or a `.zip` holding one). Null shapes
/// are dropped with their records.
pub fn read_point_layer(path: &Path, crs: Option<Crs>) -> Result<PointLayer> {
    with_shapefile(path, |shp_path| {
        let (shapes, attributes) = read_shapefile(shp_path)?;

        let mut keep = Vec::with_capacity(shapes.len());
        let mut points = Vec::with_capacity(shapes.len());
        for (i, shape) in shapes.iter().enumerate() {
            let point = match shape {
                Shape::NullShape => continue,
                Shape::Point(p) => Point::new(p.x, p.y),
                Shape::PointM(p) => Point::new(p.x, p.y),
                Shape::PointZ(p) => Point::new(p.x, p.y),
                other => bail!("[io::shp] Record {i} of {} is a {:?}, expected a point", shp_path.display(), other.shapetype()),
            };
            keep.push(i);
            points.push(point);
        }
        if keep.len() < shapes.len() {
            warn!(path = %shp_path.display(), dropped = shapes.len() - keep.len(), "dropped null point shapes");
        }

        let crs = crs.unwrap_or_else(|| detect_crs(shp_path));
        debug!(path = %shp_path.display(), points = points.len(), %crs, "read point shapefile");
        Ok(PointLayer::new(points, attributes.take(&keep), crs)?)
    })
}

/// Run `f` on the shapefile at `path`, extracting it first if zipped.
fn with_shapefile<T>(path: &Path, f: impl FnOnce(&Path) -> Result<T>) -> Result<T> {
    if !has_extension(path, "zip") {
        return f(path);
    }
    let dir = tempfile::tempdir().context("[io::shp] Failed to create temporary directory")?;
    extract_zip(path, dir.path())?;
    let shp_path = find_with_extension(dir.path(), "shp")?;
    f(&shp_path)
}

/// Reads all shapes and the attribute table from a `.shp` file path.
/// Attribute columns keep the order of the `.dbf` header.
pub fn read_shapefile(path: &Path) -> Result<(Vec<Shape>, Relation)> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("[io::shp] Failed to open shapefile: {}", path.display()))?;

    let mut items = Vec::with_capacity(reader.shape_count()?);
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.context("[io::shp] Error reading shape+record")?;
        items.push((shape, record));
    }

    let dbf_path = path.with_extension("dbf");
    let fields = dbase::Reader::from_path(&dbf_path)
        .with_context(|| format!("[io::shp] Failed to open attribute table: {}", dbf_path.display()))?
        .fields()
        .iter()
        .map(|field| field.name().to_string())
        .collect::<Vec<_>>();
    let fields = attribute_columns(fields, items.first().map(|(_, record)| record));

    let (shapes, records): (Vec<Shape>, Vec<Record>) = items.into_iter().unzip();
    let rows = records.iter()
        .map(|record| fields.iter().map(|name| record.get(name).map_or(Value::Null, field_value)).collect())
        .collect();
    Ok((shapes, Relation::from_rows(fields, rows)?))
}

/// Name of the pseudo-field dBase readers report for the deletion marker.
const DELETION_FLAG: &str = "DeletionFlag";

/// Keep the `.dbf` header fields that hold attributes, checked against the
/// first record when there is one.
fn attribute_columns(fields: Vec<String>, first: Option<&Record>) -> Vec<String> {
    fields.into_iter()
        .filter(|name| name != DELETION_FLAG)
        .filter(|name| first.is_none_or(|record| record.get(name).is_some()))
        .collect()
}

/// Convert a dBase field to a cell value. Character fields are trimmed.
fn field_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Character(s) => s.as_deref().map(str::trim).into(),
        FieldValue::Memo(s) => s.as_str().into(),
        FieldValue::Numeric(n) => (*n).into(),
        FieldValue::Float(f) => f.map(f64::from).into(),
        FieldValue::Double(f) | FieldValue::Currency(f) => (*f).into(),
        FieldValue::Integer(i) => Value::Int((*i).into()),
        FieldValue::Logical(b) => (*b).into(),
        FieldValue::Date(d) => d.as_ref().map(|d| format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day())).into(),
        _ => Value::Null,
    }
}

/// Convert a polygon shape to a multipolygon; each outer ring starts a new
/// part and inner rings attach to the preceding outer ring.
fn shape_to_multipolygon(shape: &Shape) -> Result<MultiPolygon<f64>> {
    macro_rules! rings {
        ($polygon:expr) => {
            $polygon.rings().iter()
                .map(|ring| {
                    let coords = ring.points().iter().map(|p| Coord { x: p.x, y: p.y }).collect::<Vec<_>>();
                    (LineString(coords), matches!(ring, PolygonRing::Outer(_)))
                })
                .collect::<Vec<_>>()
        };
    }

    let rings = match shape {
        Shape::NullShape => Vec::new(),
        Shape::Polygon(p) => rings!(p),
        Shape::PolygonM(p) => rings!(p),
        Shape::PolygonZ(p) => rings!(p),
        other => bail!("found a {:?}", other.shapetype()),
    };
    Ok(group_rings(rings))
}

fn group_rings(rings: Vec<(LineString<f64>, bool)>) -> MultiPolygon<f64> {
    let mut polys: Vec<Polygon<f64>> = Vec::new();
    let mut current_exterior: Option<LineString<f64>> = None;
    let mut current_holes: Vec<LineString<f64>> = Vec::new();

    for (ring, is_exterior) in rings {
        if is_exterior || current_exterior.is_none() {
            if let Some(ext) = current_exterior.take() {
                polys.push(Polygon::new(ext, std::mem::take(&mut current_holes)));
            }
            current_exterior = Some(ring);
        } else {
            current_holes.push(ring);
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(Polygon::new(ext, current_holes));
    }

    MultiPolygon(polys)
}

/// Detect the CRS from the `.prj` next to a shapefile.
fn detect_crs(shp_path: &Path) -> Crs {
    let prj_path = shp_path.with_extension("prj");
    let Ok(wkt) = fs::read_to_string(&prj_path) else {
        warn!(path = %shp_path.display(), "no .prj file; CRS is unknown");
        return Crs::Unknown;
    };
    match crs_from_wkt(&wkt) {
        Some(code) => Crs::Epsg(code),
        None => {
            warn!(path = %prj_path.display(), "unrecognised projection; CRS is unknown");
            Crs::Unknown
        },
    }
}

static OUTER_AUTHORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"AUTHORITY\[\s*"EPSG"\s*,\s*"?(\d+)"?\s*\]\s*\]\s*$"#).unwrap()
});

static UTM_ZONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"WGS_1984_UTM_Zone_(\d{1,2})([NS])").unwrap()
});

/// Identify the EPSG code of a WKT projection string, from its outermost
/// `AUTHORITY` or from well-known ESRI projection names.
pub fn crs_from_wkt(wkt: &str) -> Option<u32> {
    let wkt = wkt.trim();
    if let Some(code) = OUTER_AUTHORITY.captures(wkt).and_then(|c| c[1].parse().ok()) {
        return Some(code);
    }

    if let Some(caps) = UTM_ZONE.captures(wkt) {
        let zone: u32 = caps[1].parse().ok().filter(|z| (1..=60).contains(z))?;
        return Some(if &caps[2] == "N" { 32600 + zone } else { 32700 + zone });
    }

    let projected = wkt.starts_with("PROJCS");
    if wkt.contains("British_National_Grid") {
        Some(27700)
    } else if ["Web_Mercator", "Pseudo_Mercator", "Popular_Visualisation"].iter().any(|name| wkt.contains(name)) {
        Some(3857)
    } else if !projected && wkt.contains("GCS_WGS_1984") {
        Some(4326)
    } else if !projected && wkt.contains("GCS_North_American_1983") {
        Some(4269)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BNG_ESRI: &str = r#"PROJCS["British_National_Grid",GEOGCS["GCS_OSGB_1936",DATUM["D_OSGB_1936",SPHEROID["Airy_1849",6377563.396,299.3249646]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["False_Easting",400000.0],PARAMETER["False_Northing",-100000.0],PARAMETER["Central_Meridian",-2.0],PARAMETER["Scale_Factor",0.9996012717],PARAMETER["Latitude_Of_Origin",49.0],UNIT["Meter",1.0]]"#;

    #[test]
    fn crs_from_esri_names() {
        assert_eq!(crs_from_wkt(BNG_ESRI), Some(27700));
        assert_eq!(crs_from_wkt(r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#), Some(4326));
        assert_eq!(crs_from_wkt(r#"PROJCS["WGS_1984_UTM_Zone_30N",GEOGCS["GCS_WGS_1984"]]"#), Some(32630));
        assert_eq!(crs_from_wkt(r#"PROJCS["WGS_1984_UTM_Zone_33S",GEOGCS["GCS_WGS_1984"]]"#), Some(32733));
        assert_eq!(crs_from_wkt(r#"PROJCS["Lambert_Conformal_Conic",GEOGCS["GCS_WGS_1984"]]"#), None);
    }

    #[test]
    fn outermost_authority_wins() {
        let wkt = r#"PROJCS["OSGB 1936 / British National Grid",GEOGCS["OSGB 1936",AUTHORITY["EPSG","4277"]],UNIT["metre",1],AUTHORITY["EPSG","27700"]]"#;
        assert_eq!(crs_from_wkt(wkt), Some(27700));
        let inner_only = r#"PROJCS["Custom",GEOGCS["OSGB 1936",AUTHORITY["EPSG","4277"]],UNIT["metre",1]]"#;
        assert_eq!(crs_from_wkt(inner_only), None);
    }

    #[test]
    fn rings_group_into_parts() {
        let ring = |x: f64, size: f64| LineString::from(vec![(x, 0.0), (x, size), (x + size, size), (x + size, 0.0), (x, 0.0)]);
        let grouped = group_rings(vec![
            (ring(0.0, 4.0), true),
            (ring(1.0, 1.0), false),
            (ring(10.0, 2.0), true),
        ]);
        assert_eq!(grouped.0.len(), 2);
        assert_eq!(grouped.0[0].interiors().len(), 1);
        assert_eq!(grouped.0[1].interiors().len(), 0);

        let orphan_hole = group_rings(vec![(ring(0.0, 1.0), false)]);
        assert_eq!(orphan_hole.0.len(), 1);
    }

    #[test]
    fn deletion_flag_is_not_an_attribute() {
        let fields = || vec![DELETION_FLAG.to_string(), "NAME".to_string(), "AREA".to_string()];
        assert_eq!(attribute_columns(fields(), None), vec!["NAME", "AREA"]);

        let mut record = Record::default();
        record.insert("NAME".to_string(), FieldValue::Character(Some("Camden".into())));
        assert_eq!(attribute_columns(fields(), Some(&record)), vec!["NAME"]);
    }

    #[test]
    fn field_values() {
        assert_eq!(field_value(&FieldValue::Character(Some("  Camden ".into()))), Value::from("Camden"));
        assert_eq!(field_value(&FieldValue::Character(None)), Value::Null);
        assert_eq!(field_value(&FieldValue::Numeric(Some(3.5))), Value::Float(3.5));
        assert_eq!(field_value(&FieldValue::Integer(7)), Value::Int(7));
        assert_eq!(field_value(&FieldValue::Logical(Some(true))), Value::Bool(true));
    }
}
