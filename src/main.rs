//! geofield CLI - inspect and edit geographic form state stored in JSON records

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use geofield::util::{coordinates_from_geojson, enclosing_bounds};
use geofield::{parse_pasted, Bounds, Component, Coordinate, FieldDefinition, MemoryStore};

#[derive(Parser)]
#[command(name = "geofield")]
#[command(author, version, about = "Resolve and edit map field state in JSON records", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON record holding the form state
    #[arg(short, long, global = true)]
    record: Option<PathBuf>,

    /// JSON field definition
    #[arg(short, long, global = true)]
    field: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved point or bounds
    Resolve,
    /// Print the label and map container
    Render,
    /// Check a required field
    Validate,
    /// Store a point
    Point {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
    /// Store bounds
    Bounds {
        #[arg(long, allow_hyphen_values = true)]
        sw_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        sw_lng: f64,
        #[arg(long, allow_hyphen_values = true)]
        ne_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        ne_lng: f64,
    },
    /// Store a point pasted as "lat, lng"
    Paste {
        text: String,
    },
    /// Store the bounds enclosing every position of a GeoJSON file
    Fit {
        geojson: PathBuf,
    },
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")
}

fn load_record(path: &Path) -> Result<MemoryStore> {
    let file = File::open(path).with_context(|| format!("opening record {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing record {}", path.display()))?;
    Ok(MemoryStore::from_value(value))
}

fn save_record(path: &Path, store: MemoryStore) -> Result<()> {
    let value = store.into_value().context("record is not initialized")?;
    let mut file = File::create(path).with_context(|| format!("writing record {}", path.display()))?;
    serde_json::to_writer_pretty(&mut file, &value)?;
    writeln!(file)?;
    info!(record = %path.display(), "record updated");
    Ok(())
}

fn load_component(path: &Path) -> Result<Component> {
    let file = File::open(path).with_context(|| format!("opening field definition {}", path.display()))?;
    let definition = FieldDefinition::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing field definition {}", path.display()))?;
    Ok(definition.build()?)
}

fn store_point(component: &Component, store: &mut MemoryStore, c: Coordinate) -> Result<()> {
    match *component {
        Component::PointField(ref field) => Ok(field.set_coordinates(store, &c)?),
        _ => bail!("field definition is not a point field"),
    }
}

fn store_bounds(component: &Component, store: &mut MemoryStore, b: Bounds) -> Result<()> {
    if !b.is_oriented() {
        warn!(bounds = ?b, "south-west corner is not south-west of north-east corner");
    }
    match *component {
        Component::BoundsField(ref field) => Ok(field.set_bounds(store, &b)?),
        _ => bail!("field definition is not a bounds field"),
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    let record = cli.record.context("--record is required")?;
    let component = load_component(&cli.field.context("--field is required")?)?;
    let mut store = load_record(&record)?;

    match cli.command {
        Commands::Resolve => print_json(&component.resolve_json(&store))?,
        Commands::Render => print_json(&serde_json::to_value(component.render(&store))?)?,
        Commands::Validate => {
            component.validate(&store)?;
            println!("ok");
        }
        Commands::Point { lat, lng } => {
            store_point(&component, &mut store, Coordinate::new(lat, lng))?;
            save_record(&record, store)?;
        }
        Commands::Bounds { sw_lat, sw_lng, ne_lat, ne_lng } => {
            store_bounds(&component, &mut store, Bounds::new(sw_lat, sw_lng, ne_lat, ne_lng))?;
            save_record(&record, store)?;
        }
        Commands::Paste { text } => {
            let c = parse_pasted(&text).with_context(|| format!("not a coordinate pair: {:?}", text))?;
            store_point(&component, &mut store, c)?;
            save_record(&record, store)?;
        }
        Commands::Fit { geojson } => {
            let file = File::open(&geojson).with_context(|| format!("opening {}", geojson.display()))?;
            let points = coordinates_from_geojson(BufReader::new(file))?;
            let bounds = enclosing_bounds(points.iter())
                .with_context(|| format!("no positions in {}", geojson.display()))?;
            store_bounds(&component, &mut store, bounds)?;
            save_record(&record, store)?;
        }
    }
    Ok(())
}
