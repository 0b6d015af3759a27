//! Record store for vehicles and trips.
//!
//! [`RecordStore`] is the async trait the analytics pipeline and the CLI
//! talk to. [`MemoryStore`] keeps everything in process; [`CsvStore`]
//! persists `vehicle_info.csv` and `trip_info.csv` in a data directory.
//! Both serialize writes through one lock per store handle and hand out
//! materialized snapshots from the query methods.

mod csv;
pub(crate) mod memory;
mod tables;

pub use self::csv::CsvStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::analytics::{TextField, filter_by_date_range, filter_by_text};
use crate::model::{NewTrip, NewVehicle, Trip, TripId, Vehicle, VehicleId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Vehicle number '{0}' is already registered")]
    DuplicateVehicleNumber(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Optional narrowing applied by [`RecordStore::query_trips`].
///
/// `vehicle` is a case-insensitive substring of the vehicle number; the date
/// bounds are inclusive. An inverted range matches nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripFilter {
    pub vehicle: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl TripFilter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Narrows `trips` with the engine's date-range and text filters. An
    /// open bound extends to the earliest or latest representable date.
    pub fn apply(&self, trips: &[Trip]) -> Vec<Trip> {
        let from = self.from.unwrap_or(NaiveDate::MIN);
        let to = self.to.unwrap_or(NaiveDate::MAX);
        let dated = filter_by_date_range(trips, from, to);

        match self.vehicle.as_deref() {
            Some(needle) => filter_by_text(&dated, TextField::VehicleNumber, needle),
            None => dated,
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns every trip matching `filter`, in insertion order.
    async fn query_trips(&self, filter: &TripFilter) -> Result<Vec<Trip>, StoreError>;

    async fn query_vehicles(&self) -> Result<Vec<Vehicle>, StoreError>;

    async fn insert_trip(&self, trip: NewTrip) -> Result<TripId, StoreError>;

    async fn update_trip(&self, trip_id: TripId, trip: NewTrip) -> Result<(), StoreError>;

    async fn delete_trip(&self, trip_id: TripId) -> Result<(), StoreError>;

    /// Fails with [`StoreError::DuplicateVehicleNumber`] if the number is taken.
    async fn insert_vehicle(&self, vehicle: NewVehicle) -> Result<VehicleId, StoreError>;

    /// Trips keep the vehicle number they were recorded with, even when the
    /// vehicle's number changes.
    async fn update_vehicle(
        &self,
        vehicle_id: VehicleId,
        vehicle: NewVehicle,
    ) -> Result<(), StoreError>;

    /// Trips of the deleted vehicle are kept.
    async fn delete_vehicle(&self, vehicle_id: VehicleId) -> Result<(), StoreError>;
}
