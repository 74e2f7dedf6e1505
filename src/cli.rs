use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

use geocontain::{BoundaryPolicy, MultiMatch};

/// Spatial and attribute joins between point, polygon and tabular datasets
#[derive(Parser, Debug)]
#[command(name = "geojoin", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Keep the points that fall inside any polygon
    Clip(ClipArgs),

    /// Count points per polygon
    Count(CountArgs),

    /// Join a table onto polygons by name
    Join(JoinArgs),

    /// Run a pipeline described by a JSON config file
    Run(RunArgs),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, ValueEnum)]
pub enum Boundary {
    #[default]
    Inclusive,
    Exclusive,
}

impl From<Boundary> for BoundaryPolicy {
    fn from(boundary: Boundary) -> Self {
        match boundary {
            Boundary::Inclusive => BoundaryPolicy::Inclusive,
            Boundary::Exclusive => BoundaryPolicy::Exclusive,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, ValueEnum)]
pub enum Matches {
    #[default]
    First,
    All,
    Error,
}

impl From<Matches> for MultiMatch {
    fn from(matches: Matches) -> Self {
        match matches {
            Matches::First => MultiMatch::First,
            Matches::All => MultiMatch::All,
            Matches::Error => MultiMatch::Error,
        }
    }
}

/// Point input shared by `clip` and `count`.
#[derive(Args, Debug)]
pub struct PointArgs {
    /// Point shapefile (.shp or .zip) or CSV with coordinate columns
    #[arg(value_hint = ValueHint::FilePath)]
    pub points: PathBuf,

    /// Polygon shapefile (.shp or .zip)
    #[arg(value_hint = ValueHint::FilePath)]
    pub polygons: PathBuf,

    /// X (easting/longitude) column of a CSV point file
    #[arg(long, default_value = "x")]
    pub x_column: String,

    /// Y (northing/latitude) column of a CSV point file
    #[arg(long, default_value = "y")]
    pub y_column: String,

    /// EPSG code of the points, if not given by a .prj
    #[arg(long)]
    pub points_epsg: Option<u32>,

    /// EPSG code of the polygons, if not given by a .prj
    #[arg(long)]
    pub polygons_epsg: Option<u32>,

    /// Reproject both layers to this EPSG code first
    #[arg(long)]
    pub target_epsg: Option<u32>,

    /// Whether points on a polygon boundary are inside
    #[arg(long, value_enum, default_value_t)]
    pub boundary: Boundary,

    /// Evaluate points on a single thread
    #[arg(long)]
    pub serial: bool,
}

#[derive(Args, Debug)]
pub struct ClipArgs {
    #[command(flatten)]
    pub input: PointArgs,

    /// Output CSV of the kept points
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct CountArgs {
    #[command(flatten)]
    pub input: PointArgs,

    /// Name column of the polygons
    #[arg(long, default_value = "NAME")]
    pub name_column: String,

    /// Name of the count column
    #[arg(long, default_value = "count")]
    pub count_column: String,

    /// How points inside several polygons are counted
    #[arg(long = "multi-match", value_enum, default_value_t)]
    pub multi_match: Matches,

    /// Output CSV with one row per polygon
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct JoinArgs {
    /// Polygon shapefile (.shp or .zip)
    #[arg(value_hint = ValueHint::FilePath)]
    pub polygons: PathBuf,

    /// CSV table keyed by polygon name
    #[arg(value_hint = ValueHint::FilePath)]
    pub table: PathBuf,

    /// Name column of the polygons
    #[arg(long, default_value = "NAME")]
    pub name_column: String,

    /// Column of the table holding polygon names
    #[arg(long)]
    pub key: String,

    /// Column of the table to sum per name
    #[arg(long)]
    pub value: Option<String>,

    /// Count rows per name instead of summing `--value`
    #[arg(long, requires = "value")]
    pub count: bool,

    /// Rename a table name before joining (OLD=NEW, repeatable)
    #[arg(long = "rename", value_name = "OLD=NEW", value_parser = parse_rename)]
    pub renames: Vec<(String, String)>,

    /// Read the table as Latin-1 instead of UTF-8
    #[arg(long)]
    pub latin1: bool,

    /// Output CSV with one row per polygon
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Pipeline config (JSON)
    #[arg(value_hint = ValueHint::FilePath)]
    pub config: PathBuf,
}

fn parse_rename(s: &str) -> Result<(String, String), String> {
    let (old, new) = s.split_once('=')
        .ok_or_else(|| format!("expected OLD=NEW, got {s:?}"))?;
    if old.is_empty() {
        return Err(format!("empty name in {s:?}"));
    }
    Ok((old.to_string(), new.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn join_with_renames() {
        let cli = Cli::try_parse_from([
            "geojoin", "-v", "join", "boroughs.zip", "crimes.csv",
            "--key", "Borough", "--value", "Count",
            "--rename", "Corp of London=City of London",
            "-o", "out.csv",
        ]).unwrap();
        assert_eq!(cli.verbose, 1);
        let Commands::Join(args) = cli.command else { panic!("expected join") };
        assert_eq!(args.renames, vec![("Corp of London".to_string(), "City of London".to_string())]);
        assert_eq!(args.name_column, "NAME");
        assert!(!args.count);
    }

    #[test]
    fn rename_needs_equals() {
        assert!(parse_rename("Corp of London").is_err());
        assert!(parse_rename("=x").is_err());
        assert_eq!(parse_rename("a=b=c").unwrap(), ("a".into(), "b=c".into()));
    }

    #[test]
    fn count_options() {
        let cli = Cli::try_parse_from([
            "geojoin", "count", "crimes.csv", "boroughs.shp", "--x-column", "Easting",
            "--boundary", "exclusive", "--multi-match", "all", "-o", "counts.csv",
        ]).unwrap();
        let Commands::Count(args) = cli.command else { panic!("expected count") };
        assert_eq!(args.input.x_column, "Easting");
        assert_eq!(BoundaryPolicy::from(args.input.boundary), BoundaryPolicy::Exclusive);
        assert_eq!(MultiMatch::from(args.multi_match), MultiMatch::All);
    }
}
