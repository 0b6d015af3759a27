//! CLI entry point for fleetstat.
//!
//! Provides subcommands for registering vehicles, recording trips, querying
//! fleet analytics, writing JSON reports and CSV exports, and running a
//! simulated live-tracking feed.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use fleetstat::analytics::aggregate::{
    aggregate_by_group, by_day, by_month, by_trip, by_vehicle, sorted_entries, summarize_vehicles,
};
use fleetstat::analytics::filter::contains_ignore_case;
use fleetstat::analytics::report::{build_report, write_json};
use fleetstat::analytics::types::AggregateResult;
use fleetstat::analytics::aggregate_fleet;
use fleetstat::config::AppConfig;
use fleetstat::model::{NewTrip, NewVehicle, TripId, VehicleId, VehicleType};
use fleetstat::output::{DisplayAggregate, render_groups_json, round2, write_csv};
use fleetstat::parser::parse_date;
use fleetstat::simulate::{self, SimulatedRoute};
use fleetstat::store::{CsvStore, RecordStore, TripFilter};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::Directive,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "fleetstat")]
#[command(about = "Track vehicles and trips and report fleet fuel statistics", long_about = None)]
struct Cli {
    /// Optional JSON config file overriding environment settings
    #[arg(long, global = true)]
    config: Option<String>,

    /// Data directory holding the vehicle and trip tables
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a vehicle
    AddVehicle(VehicleArgs),
    /// Replace the details of a registered vehicle
    UpdateVehicle {
        #[arg(value_name = "VEHICLE_ID")]
        vehicle_id: VehicleId,

        #[command(flatten)]
        vehicle: VehicleArgs,
    },
    /// Remove a vehicle (its trips are kept)
    DeleteVehicle {
        #[arg(value_name = "VEHICLE_ID")]
        vehicle_id: VehicleId,
    },
    /// List vehicles with their trip count and total distance
    Vehicles {
        /// Only show vehicle numbers containing this text
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Record a trip
    AddTrip(TripArgs),
    /// Replace the details of a recorded trip
    UpdateTrip {
        #[arg(value_name = "TRIP_ID")]
        trip_id: TripId,

        #[command(flatten)]
        trip: TripArgs,
    },
    /// Remove a trip
    DeleteTrip {
        #[arg(value_name = "TRIP_ID")]
        trip_id: TripId,
    },
    /// List trips, newest first
    Trips(FilterArgs),
    /// Show distance, fuel and mileage, optionally grouped
    Analytics {
        #[command(flatten)]
        filter: FilterArgs,

        /// How to group the statistics
        #[arg(short, long, value_enum, default_value_t = GroupBy::Fleet)]
        group: GroupBy,

        /// Print the rounded statistics to stdout as JSON instead of logging them
        #[arg(long)]
        json: bool,
    },
    /// Write a JSON report with fleet, per-vehicle and per-day statistics
    Report {
        #[command(flatten)]
        filter: FilterArgs,

        /// File to write the report to
        #[arg(short, long, default_value = "fleet_report.json")]
        output: PathBuf,
    },
    /// Export trips to a CSV file
    ExportTrips {
        #[command(flatten)]
        filter: FilterArgs,

        /// CSV file to write
        #[arg(short, long, default_value = "trip_data.csv")]
        output: String,
    },
    /// Insert simulated trips on a timer, like a live tracking feed
    Simulate {
        /// Vehicle number the simulated trips belong to
        #[arg(long, default_value = "RJ14XYZ1234")]
        vehicle: String,

        /// Seconds between trips
        #[arg(short, long, default_value_t = 5)]
        interval: u64,

        /// Number of trips to insert (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 0)]
        count: usize,
    },
}

#[derive(Args)]
struct VehicleArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    number: String,

    #[arg(long)]
    owner: String,

    /// Car, Bike, Truck or Bus
    #[arg(long = "type")]
    vehicle_type: VehicleType,

    /// Registration date (YYYY-MM-DD)
    #[arg(long, value_parser = date_arg)]
    registered: NaiveDate,
}

#[derive(Args)]
struct TripArgs {
    #[arg(long)]
    vehicle: String,

    /// Fuel used, in liters
    #[arg(long)]
    fuel: f64,

    /// Trip date (YYYY-MM-DD)
    #[arg(long, value_parser = date_arg)]
    date: NaiveDate,

    #[arg(long)]
    from: String,

    #[arg(long)]
    to: String,

    #[arg(long, allow_hyphen_values = true)]
    lat_start: f64,

    #[arg(long, allow_hyphen_values = true)]
    lon_start: f64,

    #[arg(long, allow_hyphen_values = true)]
    lat_end: f64,

    #[arg(long, allow_hyphen_values = true)]
    lon_end: f64,

    /// Route distance, in kilometers
    #[arg(long)]
    distance: f64,
}

#[derive(Args)]
struct FilterArgs {
    /// Only trips whose vehicle number contains this text
    #[arg(long)]
    vehicle: Option<String>,

    /// First trip date to include (YYYY-MM-DD)
    #[arg(long, value_parser = date_arg)]
    since: Option<NaiveDate>,

    /// Last trip date to include (YYYY-MM-DD)
    #[arg(long, value_parser = date_arg)]
    until: Option<NaiveDate>,
}

#[derive(Clone, Copy, ValueEnum)]
enum GroupBy {
    Fleet,
    Vehicle,
    Trip,
    Day,
    Month,
}

impl From<VehicleArgs> for NewVehicle {
    fn from(a: VehicleArgs) -> Self {
        NewVehicle {
            name: a.name,
            number: a.number,
            owner: a.owner,
            vehicle_type: a.vehicle_type,
            registration_date: a.registered,
        }
    }
}

impl From<TripArgs> for NewTrip {
    fn from(a: TripArgs) -> Self {
        NewTrip {
            vehicle_number: a.vehicle,
            fuel_consumption: a.fuel,
            trip_date: a.date,
            start_location: a.from,
            end_location: a.to,
            lat_start: a.lat_start,
            lon_start: a.lon_start,
            lat_end: a.lat_end,
            lon_end: a.lon_end,
            distance: a.distance,
        }
    }
}

impl From<FilterArgs> for TripFilter {
    fn from(a: FilterArgs) -> Self {
        TripFilter {
            vehicle: a.vehicle,
            from: a.since,
            to: a.until,
        }
    }
}

fn date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(path) = &cli.config {
        config = config.merge_file(path)?;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    // Keep the guard alive so buffered log lines are flushed on exit
    let _file_guard = init_logging(&config.log_file_path)?;

    let store = CsvStore::open(&config.data_dir)
        .with_context(|| format!("failed to open data dir {}", config.data_dir.display()))?;

    match cli.command {
        Commands::AddVehicle(args) => {
            let vehicle_id = store.insert_vehicle(args.into()).await?;
            info!(vehicle_id, "Vehicle added successfully");
        }
        Commands::UpdateVehicle {
            vehicle_id,
            vehicle,
        } => {
            store.update_vehicle(vehicle_id, vehicle.into()).await?;
            info!(vehicle_id, "Vehicle updated successfully");
        }
        Commands::DeleteVehicle { vehicle_id } => {
            store.delete_vehicle(vehicle_id).await?;
            info!(vehicle_id, "Vehicle deleted");
        }
        Commands::Vehicles { search } => list_vehicles(&store, &search).await?,
        Commands::AddTrip(args) => {
            let trip_id = store.insert_trip(args.into()).await?;
            info!(trip_id, "Trip added successfully");
        }
        Commands::UpdateTrip { trip_id, trip } => {
            store.update_trip(trip_id, trip.into()).await?;
            info!(trip_id, "Trip updated successfully");
        }
        Commands::DeleteTrip { trip_id } => {
            store.delete_trip(trip_id).await?;
            info!(trip_id, "Trip deleted");
        }
        Commands::Trips(filter) => list_trips(&store, &filter.into()).await?,
        Commands::Analytics {
            filter,
            group,
            json,
        } => show_analytics(&store, &filter.into(), group, json).await?,
        Commands::Report { filter, output } => {
            let report = build_report(&store, &filter.into()).await?;
            write_json(&output, &report)?;
        }
        Commands::ExportTrips { filter, output } => {
            let trips = store.query_trips(&filter.into()).await?;
            write_csv(&output, &trips)?;
            info!(rows = trips.len(), path = %output, "Trips exported");
        }
        Commands::Simulate {
            vehicle,
            interval,
            count,
        } => {
            let route = SimulatedRoute::jaipur_churu(&vehicle);
            let mut rng = StdRng::from_entropy();
            simulate::run(
                &store,
                &route,
                &mut rng,
                Duration::from_secs(interval),
                count,
            )
            .await?;
        }
    }

    Ok(())
}

/// Colored stderr output plus a JSON rolling log file.
fn init_logging(log_file_path: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = log_file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = log_file_path
        .file_name()
        .unwrap_or(OsStr::new("fleetstat.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse::<Directive>()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse::<Directive>()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}

async fn list_vehicles(store: &dyn RecordStore, search: &str) -> Result<()> {
    let vehicles = store.query_vehicles().await?;
    let trips = store.query_trips(&TripFilter::all()).await?;

    let needle = search.trim().to_lowercase();
    let summaries: Vec<_> = summarize_vehicles(&vehicles, &trips)
        .into_iter()
        .filter(|s| contains_ignore_case(&s.vehicle_number, &needle))
        .collect();

    if summaries.is_empty() {
        warn!(search, "No vehicles found matching the search term");
        return Ok(());
    }

    for (i, s) in summaries.iter().enumerate() {
        info!(
            s_no = i + 1,
            vehicle_id = s.vehicle_id,
            name = %s.vehicle_name,
            number = %s.vehicle_number,
            owner = %s.owner_name,
            vehicle_type = %s.vehicle_type,
            registered = %s.registration_date,
            total_trips = s.total_trips,
            total_distance_km = round2(s.total_distance),
            "Vehicle"
        );
    }

    Ok(())
}

async fn list_trips(store: &dyn RecordStore, filter: &TripFilter) -> Result<()> {
    let mut trips = store.query_trips(filter).await?;
    if trips.is_empty() {
        warn!("No trips match the selected filters");
        return Ok(());
    }

    trips.sort_by(|a, b| b.trip_date.cmp(&a.trip_date));

    for (i, t) in trips.iter().enumerate() {
        info!(
            s_no = i + 1,
            trip_id = t.trip_id,
            vehicle = %t.vehicle_number,
            date = %t.trip_date,
            from = %t.start_location,
            to = %t.end_location,
            distance_km = t.distance,
            fuel_l = t.fuel_consumption,
            "Trip"
        );
    }

    Ok(())
}

async fn show_analytics(
    store: &dyn RecordStore,
    filter: &TripFilter,
    group: GroupBy,
    json: bool,
) -> Result<()> {
    let trips = store.query_trips(filter).await?;

    let rows = match group {
        GroupBy::Fleet => vec![("fleet".to_string(), aggregate_fleet(&trips))],
        GroupBy::Vehicle => labelled(aggregate_by_group(&trips, by_vehicle)),
        GroupBy::Trip => labelled(aggregate_by_group(&trips, by_trip)),
        GroupBy::Day => labelled(aggregate_by_group(&trips, by_day)),
        GroupBy::Month => labelled(aggregate_by_group(&trips, by_month)),
    };

    if json {
        println!("{}", render_groups_json(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        warn!("No trips to aggregate");
    }
    for (group, stats) in &rows {
        log_aggregate(group, stats);
    }

    Ok(())
}

fn labelled<K: Ord + Display>(groups: HashMap<K, AggregateResult>) -> Vec<(String, AggregateResult)> {
    sorted_entries(groups)
        .into_iter()
        .map(|entry| (entry.key.to_string(), entry.stats))
        .collect()
}

fn log_aggregate(group: &str, result: &AggregateResult) {
    let shown = DisplayAggregate::from(result);
    info!(
        group,
        total_distance_km = shown.total_distance_km,
        total_fuel_l = shown.total_fuel_l,
        average_mileage_kmpl = shown.average_mileage_kmpl,
        trips = shown.trips,
        "Analytics"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_flags_are_since_and_until() {
        let cli = Cli::try_parse_from([
            "fleetstat",
            "analytics",
            "--vehicle",
            "RJ14",
            "--since",
            "2025-01-01",
            "--until",
            "2025-01-31 18:00:00",
            "--group",
            "day",
            "--json",
        ])
        .unwrap();

        let Commands::Analytics { filter, json, .. } = cli.command else {
            panic!("expected analytics");
        };
        assert!(json);
        assert_eq!(
            TripFilter::from(filter),
            TripFilter {
                vehicle: Some("RJ14".to_string()),
                from: NaiveDate::from_ymd_opt(2025, 1, 1),
                to: NaiveDate::from_ymd_opt(2025, 1, 31),
            }
        );
    }

    #[test]
    fn test_add_trip_from_and_to_are_locations() {
        let cli = Cli::try_parse_from([
            "fleetstat",
            "add-trip",
            "--vehicle",
            "RJ14AB1234",
            "--fuel",
            "6.2",
            "--date",
            "2025-01-05",
            "--from",
            "Jaipur",
            "--to",
            "Churu",
            "--lat-start",
            "26.9124",
            "--lon-start",
            "75.7873",
            "--lat-end",
            "28.3042",
            "--lon-end",
            "74.7375",
            "--distance",
            "198.4",
        ])
        .unwrap();

        let Commands::AddTrip(args) = cli.command else {
            panic!("expected add-trip");
        };
        let trip = NewTrip::from(args);
        assert_eq!(trip.start_location, "Jaipur");
        assert_eq!(trip.end_location, "Churu");
    }

    #[test]
    fn test_trips_rejects_old_style_date_flags() {
        assert!(Cli::try_parse_from(["fleetstat", "trips", "--from", "2025-01-01"]).is_err());
    }
}
