use std::{fs, path::Path};

use clap::Parser;
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, Polygon, PolygonRing, Writer};

use geojoin::cli::{Cli, Commands};
use geojoin::commands;
use geojoin::io::csv::{read_relation, CsvOptions};
use geojoin::{Error, Relation, Value};

/// Parse `args` as a command line and run the chosen subcommand.
fn geojoin(args: &[&str]) -> anyhow::Result<()> {
    let cli = Cli::try_parse_from(std::iter::once("geojoin").chain(args.iter().copied()))?;
    match &cli.command {
        Commands::Clip(args) => commands::clip::run(&cli, args),
        Commands::Count(args) => commands::count::run(&cli, args),
        Commands::Join(args) => commands::join::run(&cli, args),
        Commands::Run(args) => commands::run::run(&cli, args),
    }
}

/// Two 2 km squares on the British National Grid, side by side around
/// Charing Cross. Without `named`, the only attribute is a numeric code.
fn write_squares(path: &Path, named: bool) {
    let mut table = TableWriterBuilder::new();
    if named {
        table = table.add_character_field(FieldName::try_from("NAME").unwrap(), 32);
    }
    let table = table.add_numeric_field(FieldName::try_from("CODE").unwrap(), 10, 0);

    let mut writer = Writer::from_path(path, table).unwrap();
    for (i, name) in ["Westminster", "City of London"].into_iter().enumerate() {
        let x = 529_000.0 + i as f64 * 2000.0;
        let ring = vec![
            Point::new(x, 179_000.0), Point::new(x, 181_000.0), Point::new(x + 2000.0, 181_000.0),
            Point::new(x + 2000.0, 179_000.0), Point::new(x, 179_000.0),
        ];
        let mut record = Record::default();
        if named {
            record.insert("NAME".to_string(), FieldValue::Character(Some(name.to_string())));
        }
        record.insert("CODE".to_string(), FieldValue::Numeric(Some(i as f64 + 1.0)));
        writer.write_shape_and_record(&Polygon::with_rings(vec![PolygonRing::Outer(ring)]), &record).unwrap();
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn read(path: &Path) -> Relation {
    read_relation(path, &CsvOptions::default()).unwrap()
}

#[test]
fn clip_keeps_csv_columns_and_rewrites_coordinates() {
    let dir = tempfile::tempdir().unwrap();
    let (zones, points, out) = (dir.path().join("zones.shp"), dir.path().join("points.csv"), dir.path().join("out/kept.csv"));
    write_squares(&zones, false);
    fs::write(&points, "id,x,y\n1,529500,179500\n2,600000,100000\n3,532500,180500\n").unwrap();

    geojoin(&["clip", path_str(&points), path_str(&zones), "--polygons-epsg", "27700", "--points-epsg", "27700", "-o", path_str(&out)]).unwrap();

    let kept = read(&out);
    assert_eq!(kept.columns(), &["id", "x", "y"]);
    assert_eq!(kept.len(), 2);
    assert_eq!(kept.row(0), &[Value::Int(1), Value::Float(529_500.0), Value::Float(179_500.0)]);
    assert_eq!(kept.row(1), &[Value::Int(3), Value::Float(532_500.0), Value::Float(180_500.0)]);
}

#[test]
fn clip_writes_reprojected_coordinates() {
    let dir = tempfile::tempdir().unwrap();
    let (zones, points, out) = (dir.path().join("zones.shp"), dir.path().join("points.csv"), dir.path().join("kept.csv"));
    write_squares(&zones, true);
    fs::write(&points, "id,lon,lat\n1,-0.1276,51.5073\n2,-2.0,53.0\n").unwrap();

    geojoin(&[
        "clip", path_str(&points), path_str(&zones), "--x-column", "lon", "--y-column", "lat",
        "--points-epsg", "4326", "--polygons-epsg", "27700", "--target-epsg", "27700", "-o", path_str(&out),
    ]).unwrap();

    let kept = read(&out);
    assert_eq!(kept.columns(), &["id", "lon", "lat"]);
    assert_eq!(kept.len(), 1);
    let easting = kept.get(0, "lon").and_then(Value::as_f64).unwrap();
    assert!((529_800.0..530_300.0).contains(&easting), "{easting}");
}

#[test]
fn count_writes_one_row_per_polygon() {
    let dir = tempfile::tempdir().unwrap();
    let (zones, points, out) = (dir.path().join("zones.shp"), dir.path().join("points.csv"), dir.path().join("counts.csv"));
    write_squares(&zones, true);
    fs::write(&points, "Easting,Northing\n529500,179500\n530500,180500\n532500,180500\n600000,100000\n").unwrap();

    geojoin(&[
        "count", path_str(&points), path_str(&zones), "--x-column", "Easting", "--y-column", "Northing",
        "--count-column", "crimes", "-o", path_str(&out),
    ]).unwrap();

    let counts = read(&out);
    assert_eq!(counts.columns(), &["NAME", "CODE", "crimes"]);
    assert_eq!(counts.get(0, "crimes"), Some(&Value::Int(2)));
    assert_eq!(counts.get(1, "NAME"), Some(&Value::from("City of London")));
    assert_eq!(counts.get(1, "crimes"), Some(&Value::Int(1)));
}

#[test]
fn join_applies_renames() {
    let dir = tempfile::tempdir().unwrap();
    let (zones, table, out) = (dir.path().join("zones.shp"), dir.path().join("crimes.csv"), dir.path().join("joined.csv"));
    write_squares(&zones, true);
    fs::write(&table, "Borough,Count\nCorp of London,4\nWestminster,10\nCorp of London,1\n").unwrap();

    let args = ["join", path_str(&zones), path_str(&table), "--key", "Borough", "--value", "Count", "-o", path_str(&out)];
    let err = geojoin(&args).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::KeyMismatch { .. })), "{err:#}");
    assert!(!out.exists());

    let renamed: Vec<&str> = args.iter().copied().chain(["--rename", "Corp of London=City of London"]).collect();
    geojoin(&renamed).unwrap();
    let joined = read(&out);
    assert_eq!(joined.get(0, "Count"), Some(&Value::Int(10)));
    assert_eq!(joined.get(1, "Count"), Some(&Value::Int(5)));
}

#[test]
fn run_reads_a_config() {
    let dir = tempfile::tempdir().unwrap();
    write_squares(&dir.path().join("zones.shp"), true);
    fs::write(dir.path().join("points.csv"), "x,y\n529500,179500\n").unwrap();
    let config = dir.path().join("pipeline.json");
    fs::write(&config, r#"{
        "polygons": { "path": "zones.shp", "name_column": "NAME", "epsg": 27700 },
        "points": { "path": "points.csv", "epsg": 27700 },
        "output": "out.csv"
    }"#).unwrap();

    geojoin(&["run", path_str(&config)]).unwrap();
    let result = read(&dir.path().join("out.csv"));
    assert_eq!(result.columns(), &["NAME", "CODE", "count"]);
    assert_eq!(result.get(0, "count"), Some(&Value::Int(1)));
    assert_eq!(result.get(1, "count"), Some(&Value::Int(0)));
}
