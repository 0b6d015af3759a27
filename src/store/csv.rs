use async_trait::async_trait;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::tables::Tables;
use super::{RecordStore, StoreError, TripFilter};
use crate::model::{NewTrip, NewVehicle, Trip, TripId, Vehicle, VehicleId};
use crate::parser::{format_date, parse_date, parse_vehicle_type};

const VEHICLE_FILE: &str = "vehicle_info.csv";
const TRIP_FILE: &str = "trip_info.csv";
const SEQUENCE_FILE: &str = "id_sequence.csv";

/// One line of `vehicle_info.csv`.
#[derive(Debug, Serialize, Deserialize)]
struct VehicleRow {
    vehicle_id: VehicleId,
    vehicle_name: String,
    vehicle_number: String,
    owner_name: String,
    vehicle_type: String,
    registration_date: String,
}

/// One line of `id_sequence.csv`: the highest id ever assigned in `name`.
#[derive(Debug, Serialize, Deserialize)]
struct SequenceRow {
    name: String,
    seq: u64,
}

/// One line of `trip_info.csv`.
#[derive(Debug, Serialize, Deserialize)]
struct TripRow {
    trip_id: TripId,
    vehicle_number: String,
    fuel_consumption: f64,
    trip_date: String,
    start_location: String,
    end_location: String,
    lat_start: f64,
    lon_start: f64,
    lat_end: f64,
    lon_end: f64,
    distance: f64,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = StoreError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        let parse_err = |e: anyhow::Error| {
            StoreError::Parse(format!("vehicle {}: {e}", row.vehicle_id))
        };
        let vehicle = Vehicle {
            vehicle_id: row.vehicle_id,
            vehicle_type: parse_vehicle_type(&row.vehicle_type).map_err(parse_err)?,
            registration_date: parse_date(&row.registration_date).map_err(parse_err)?,
            name: row.vehicle_name,
            number: row.vehicle_number,
            owner: row.owner_name,
        };
        vehicle
            .validate()
            .map_err(|e| StoreError::Validation(format!("vehicle {}: {e}", vehicle.vehicle_id)))?;
        Ok(vehicle)
    }
}

impl From<&Vehicle> for VehicleRow {
    fn from(v: &Vehicle) -> Self {
        VehicleRow {
            vehicle_id: v.vehicle_id,
            vehicle_name: v.name.clone(),
            vehicle_number: v.number.clone(),
            owner_name: v.owner.clone(),
            vehicle_type: v.vehicle_type.to_string(),
            registration_date: format_date(v.registration_date),
        }
    }
}

impl TryFrom<TripRow> for Trip {
    type Error = StoreError;

    fn try_from(row: TripRow) -> Result<Self, Self::Error> {
        let trip_date = parse_date(&row.trip_date)
            .map_err(|e| StoreError::Parse(format!("trip {}: {e}", row.trip_id)))?;
        let trip = Trip {
            trip_id: row.trip_id,
            vehicle_number: row.vehicle_number,
            fuel_consumption: row.fuel_consumption,
            trip_date,
            start_location: row.start_location,
            end_location: row.end_location,
            lat_start: row.lat_start,
            lon_start: row.lon_start,
            lat_end: row.lat_end,
            lon_end: row.lon_end,
            distance: row.distance,
        };
        trip.validate()
            .map_err(|e| StoreError::Validation(format!("trip {}: {e}", trip.trip_id)))?;
        Ok(trip)
    }
}

impl From<&Trip> for TripRow {
    fn from(t: &Trip) -> Self {
        TripRow {
            trip_id: t.trip_id,
            vehicle_number: t.vehicle_number.clone(),
            fuel_consumption: t.fuel_consumption,
            trip_date: format_date(t.trip_date),
            start_location: t.start_location.clone(),
            end_location: t.end_location.clone(),
            lat_start: t.lat_start,
            lon_start: t.lon_start,
            lat_end: t.lat_end,
            lon_end: t.lon_end,
            distance: t.distance,
        }
    }
}

/// Persists the record tables as two CSV files in `dir`.
///
/// Every operation reads the tables from disk, applies its change and
/// rewrites the touched file while holding the store's lock, so writers
/// sharing a handle never interleave.
pub struct CsvStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl CsvStore {
    /// Opens (and creates if needed) a data directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        info!(dir = %dir.display(), "Opened CSV record store");
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    /// Reads all three files. Rows that break the entry rules, or a vehicle
    /// number registered twice, fail the whole load.
    fn load(&self) -> Result<Tables, StoreError> {
        let vehicles = read_rows::<VehicleRow>(&self.dir.join(VEHICLE_FILE))?
            .into_iter()
            .map(Vehicle::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let trips = read_rows::<TripRow>(&self.dir.join(TRIP_FILE))?
            .into_iter()
            .map(Trip::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut numbers = HashSet::new();
        for v in &vehicles {
            if !numbers.insert(v.number.trim()) {
                return Err(StoreError::DuplicateVehicleNumber(v.number.trim().to_string()));
            }
        }

        let mut tables = Tables {
            vehicles,
            trips,
            ..Default::default()
        };
        for row in read_rows::<SequenceRow>(&self.dir.join(SEQUENCE_FILE))? {
            match row.name.as_str() {
                "trip_info" => tables.trip_seq = row.seq,
                "vehicle_info" => tables.vehicle_seq = row.seq,
                other => debug!(name = other, "Ignoring unknown id sequence"),
            }
        }
        Ok(tables)
    }

    fn save_sequence(&self, tables: &Tables) -> Result<(), StoreError> {
        let rows = [
            SequenceRow {
                name: "vehicle_info".to_string(),
                seq: tables.vehicle_seq,
            },
            SequenceRow {
                name: "trip_info".to_string(),
                seq: tables.trip_seq,
            },
        ];
        write_rows(&self.dir.join(SEQUENCE_FILE), rows.into_iter())
    }

    fn save_vehicles(&self, tables: &Tables) -> Result<(), StoreError> {
        let rows = tables.vehicles.iter().map(VehicleRow::from);
        write_rows(&self.dir.join(VEHICLE_FILE), rows)
    }

    fn save_trips(&self, tables: &Tables) -> Result<(), StoreError> {
        let rows = tables.trips.iter().map(TripRow::from);
        write_rows(&self.dir.join(TRIP_FILE), rows)
    }
}

fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut rows = Vec::new();

    for result in rdr.deserialize() {
        let record: T = result?;
        rows.push(record);
    }

    Ok(rows)
}

/// Writes to a sibling temp file and renames it over `path`.
fn write_rows<T: Serialize>(path: &Path, rows: impl Iterator<Item = T>) -> Result<(), StoreError> {
    let tmp = path.with_extension("csv.tmp");
    {
        let file = File::create(&tmp)?;
        let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), "Rewrote table");
    Ok(())
}

#[async_trait]
impl RecordStore for CsvStore {
    #[tracing::instrument(skip(self))]
    async fn query_trips(&self, filter: &TripFilter) -> Result<Vec<Trip>, StoreError> {
        let _guard = self.lock.lock().await;
        let tables = self.load()?;
        let trips = tables.query_trips(filter);
        debug!(matched = trips.len(), total = tables.trips.len(), "Trips queried");
        Ok(trips)
    }

    async fn query_vehicles(&self) -> Result<Vec<Vehicle>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load()?.vehicles)
    }

    #[tracing::instrument(skip(self, trip), fields(vehicle = %trip.vehicle_number))]
    async fn insert_trip(&self, trip: NewTrip) -> Result<TripId, StoreError> {
        let _guard = self.lock.lock().await;
        let mut tables = self.load()?;
        let trip_id = tables.insert_trip(trip)?;
        self.save_trips(&tables)?;
        self.save_sequence(&tables)?;
        info!(trip_id, "Trip inserted");
        Ok(trip_id)
    }

    #[tracing::instrument(skip(self, trip))]
    async fn update_trip(&self, trip_id: TripId, trip: NewTrip) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut tables = self.load()?;
        tables.update_trip(trip_id, trip)?;
        self.save_trips(&tables)?;
        info!("Trip updated");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_trip(&self, trip_id: TripId) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut tables = self.load()?;
        tables.delete_trip(trip_id)?;
        self.save_trips(&tables)?;
        info!("Trip deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self, vehicle), fields(number = %vehicle.number))]
    async fn insert_vehicle(&self, vehicle: NewVehicle) -> Result<VehicleId, StoreError> {
        let _guard = self.lock.lock().await;
        let mut tables = self.load()?;
        let vehicle_id = tables.insert_vehicle(vehicle)?;
        self.save_vehicles(&tables)?;
        self.save_sequence(&tables)?;
        info!(vehicle_id, "Vehicle inserted");
        Ok(vehicle_id)
    }

    #[tracing::instrument(skip(self, vehicle))]
    async fn update_vehicle(
        &self,
        vehicle_id: VehicleId,
        vehicle: NewVehicle,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut tables = self.load()?;
        tables.update_vehicle(vehicle_id, vehicle)?;
        self.save_vehicles(&tables)?;
        info!("Vehicle updated");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_vehicle(&self, vehicle_id: VehicleId) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut tables = self.load()?;
        tables.delete_vehicle(vehicle_id)?;
        self.save_vehicles(&tables)?;
        info!("Vehicle deleted");
        Ok(())
    }
}
