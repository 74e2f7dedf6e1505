use std::{fs, io::Write, path::Path};

use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, Polygon, PolygonRing, Writer};

use geojoin::io::{csv::{read_relation, write_relation, CsvOptions, Encoding}, shp::{read_point_layer, read_polygon_layer}};
use geojoin::{Crs, Error, Relation, Value};

/// Write two adjacent squares named "West" and "East", the first with a hole.
fn write_zones(path: &Path) {
    let table = TableWriterBuilder::new()
        .add_character_field(FieldName::try_from("NAME").unwrap(), 32)
        .add_numeric_field(FieldName::try_from("AREA").unwrap(), 10, 0);
    let mut writer = Writer::from_path(path, table).unwrap();

    let square = |x: f64, y: f64, size: f64| vec![
        Point::new(x, y), Point::new(x, y + size), Point::new(x + size, y + size), Point::new(x + size, y), Point::new(x, y),
    ];
    let hole = vec![
        Point::new(1.0, 1.0), Point::new(2.0, 1.0), Point::new(2.0, 2.0), Point::new(1.0, 2.0), Point::new(1.0, 1.0),
    ];
    let shapes = [
        Polygon::with_rings(vec![PolygonRing::Outer(square(0.0, 0.0, 4.0)), PolygonRing::Inner(hole)]),
        Polygon::with_rings(vec![PolygonRing::Outer(square(4.0, 0.0, 4.0))]),
    ];

    for (shape, (name, area)) in shapes.iter().zip([("West", 15.0), ("East", 16.0)]) {
        let mut record = Record::default();
        record.insert("NAME".to_string(), FieldValue::Character(Some(name.to_string())));
        record.insert("AREA".to_string(), FieldValue::Numeric(Some(area)));
        writer.write_shape_and_record(shape, &record).unwrap();
    }
}

#[test]
fn polygon_shapefile_with_holes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zones.shp");
    write_zones(&path);

    let layer = read_polygon_layer(&path, "NAME", Some(Crs::Epsg(27700))).unwrap();
    assert_eq!(layer.len(), 2);
    assert_eq!(layer.crs(), Crs::Epsg(27700));
    assert_eq!(layer.attributes().columns(), &["NAME", "AREA"]);
    assert_eq!(layer.name(1), &Value::from("East"));
    assert_eq!(layer.attributes().get(0, "AREA"), Some(&Value::Float(15.0)));
    assert_eq!(layer.shapes()[0].0.len(), 1);
    assert_eq!(layer.shapes()[0].0[0].interiors().len(), 1);

    assert!(read_polygon_layer(&path, "MISSING", None).is_err());
}

#[test]
fn prj_sets_the_crs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zones.shp");
    write_zones(&path);
    fs::write(
        dir.path().join("zones.prj"),
        r#"PROJCS["British_National_Grid",GEOGCS["GCS_OSGB_1936",DATUM["D_OSGB_1936",SPHEROID["Airy_1849",6377563.396,299.3249646]]],PROJECTION["Transverse_Mercator"],UNIT["Meter",1.0]]"#,
    ).unwrap();

    assert_eq!(read_polygon_layer(&path, "NAME", None).unwrap().crs(), Crs::Epsg(27700));
    assert_eq!(read_polygon_layer(&path, "NAME", Some(Crs::Epsg(4326))).unwrap().crs(), Crs::Epsg(4326));
}

#[test]
fn zipped_shapefile() {
    let dir = tempfile::tempdir().unwrap();
    let shp = dir.path().join("zones.shp");
    write_zones(&shp);

    let zip_path = dir.path().join("zones.zip");
    let mut zip = zip::ZipWriter::new(fs::File::create(&zip_path).unwrap());
    for ext in ["shp", "shx", "dbf"] {
        zip.start_file(format!("London/zones.{ext}"), zip::write::SimpleFileOptions::default()).unwrap();
        zip.write_all(&fs::read(shp.with_extension(ext)).unwrap()).unwrap();
    }
    zip.finish().unwrap();

    let layer = read_polygon_layer(&zip_path, "NAME", None).unwrap();
    assert_eq!(layer.len(), 2);
    assert_eq!(layer.crs(), Crs::Unknown);
}

#[test]
fn polygon_file_is_not_a_point_layer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zones.shp");
    write_zones(&path);
    assert!(read_point_layer(&path, None).is_err());
}

#[test]
fn point_shapefile() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crimes.shp");
    let table = TableWriterBuilder::new().add_character_field(FieldName::try_from("TYPE").unwrap(), 16);
    let mut writer = Writer::from_path(&path, table).unwrap();
    for (x, kind) in [(1.0, "Burglary"), (5.0, "Robbery")] {
        let mut record = Record::default();
        record.insert("TYPE".to_string(), FieldValue::Character(Some(kind.to_string())));
        writer.write_shape_and_record(&Point::new(x, 0.5), &record).unwrap();
    }
    drop(writer);

    let layer = read_point_layer(&path, Some(Crs::Epsg(27700))).unwrap();
    assert_eq!(layer.len(), 2);
    assert_eq!(layer.points()[1], geo::Point::new(5.0, 0.5));
    assert_eq!(layer.attributes().get(0, "TYPE"), Some(&Value::from("Burglary")));
}

#[test]
fn csv_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counts.csv");
    let relation = Relation::from_rows(["name", "count", "rate"], vec![
        vec!["City of London".into(), Value::Int(7), Value::Float(0.25)],
        vec!["Camden".into(), Value::Int(0), Value::Null],
    ]).unwrap();

    write_relation(&relation, &path).unwrap();
    assert_eq!(read_relation(&path, &CsvOptions::default()).unwrap(), relation);
}

#[test]
fn latin1_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boroughs.csv");
    fs::write(&path, b"name,count\nB\xe9xley,3\n").unwrap();

    let options = CsvOptions { encoding: Encoding::Latin1, ..Default::default() };
    let relation = read_relation(&path, &options).unwrap();
    assert_eq!(relation.get(0, "name"), Some(&Value::from("Béxley")));

    assert!(read_relation(&path, &CsvOptions::default()).is_err());
}

#[test]
fn missing_files_are_reported() {
    let err = read_relation(Path::new("/nonexistent/table.csv"), &CsvOptions::default()).unwrap_err();
    assert!(err.to_string().contains("table.csv"));
    assert!(err.downcast_ref::<Error>().is_none());
}
