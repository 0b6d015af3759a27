//! Data types produced by the aggregation engine.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;

use crate::analytics::utility::{CompensatedSum, ratio};
use crate::model::{Trip, VehicleId, VehicleType};

/// Distance, fuel and mileage over a group of trips.
///
/// Values are kept at full precision; rounding for display is done by
/// [`crate::output`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AggregateResult {
    /// Kilometers.
    pub total_distance: f64,
    /// Liters.
    pub total_fuel: f64,
    /// Kilometers per liter; 0.0 when no fuel was recorded.
    pub average_mileage: f64,
    pub trips: usize,
}

/// Accumulates trips into an [`AggregateResult`].
#[derive(Debug, Clone, Default)]
pub(crate) struct TripTotals {
    distance: CompensatedSum,
    fuel: CompensatedSum,
    trips: usize,
}

impl TripTotals {
    pub(crate) fn push(&mut self, trip: &Trip) {
        self.distance.add(trip.distance);
        self.fuel.add(trip.fuel_consumption);
        self.trips += 1;
    }

    pub(crate) fn finish(&self) -> AggregateResult {
        let total_distance = self.distance.total();
        let total_fuel = self.fuel.total();
        AggregateResult {
            total_distance,
            total_fuel,
            average_mileage: ratio(total_distance, total_fuel),
            trips: self.trips,
        }
    }
}

/// Calendar month bucket used for time-series grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One registered vehicle with its trip count and distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleSummary {
    pub vehicle_id: VehicleId,
    pub vehicle_name: String,
    pub vehicle_number: String,
    pub owner_name: String,
    pub vehicle_type: VehicleType,
    pub registration_date: NaiveDate,
    pub total_trips: usize,
    pub total_distance: f64,
}

/// A group key paired with its aggregate, for ordered listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupEntry<K> {
    pub key: K,
    #[serde(flatten)]
    pub stats: AggregateResult,
}

/// Fleet, per-vehicle and per-day statistics over one trip snapshot.
#[derive(Debug, Serialize)]
pub struct FleetReport {
    pub generated_at: DateTime<Utc>,
    pub fleet: AggregateResult,
    /// Sorted by vehicle number.
    pub by_vehicle: Vec<GroupEntry<String>>,
    /// Chronological.
    pub by_day: Vec<GroupEntry<NaiveDate>>,
    pub vehicles: Vec<VehicleSummary>,
}
