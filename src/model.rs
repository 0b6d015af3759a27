//! Vehicle and trip records as held by the record store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type VehicleId = u64;
pub type TripId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    Car,
    Bike,
    Truck,
    Bus,
}

impl VehicleType {
    pub const ALL: [VehicleType; 4] = [Self::Car, Self::Bike, Self::Truck, Self::Bus];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Car => "Car",
            Self::Bike => "Bike",
            Self::Truck => "Truck",
            Self::Bus => "Bus",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown vehicle type '{s}' (expected Car, Bike, Truck or Bus)"))
    }
}

/// A registered vehicle. `number` is the natural key trips refer to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub vehicle_id: VehicleId,
    pub name: String,
    pub number: String,
    pub owner: String,
    pub vehicle_type: VehicleType,
    pub registration_date: NaiveDate,
}

/// One recorded movement of a vehicle between two points on a given date.
///
/// `vehicle_number` is not checked against the vehicle table, so a trip may
/// reference a vehicle that was never registered or has since been deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub trip_id: TripId,
    pub vehicle_number: String,
    /// Liters.
    pub fuel_consumption: f64,
    pub trip_date: NaiveDate,
    pub start_location: String,
    pub end_location: String,
    pub lat_start: f64,
    pub lon_start: f64,
    pub lat_end: f64,
    pub lon_end: f64,
    /// Kilometers, as reported by the routing service.
    pub distance: f64,
}

/// Vehicle fields supplied on registration or update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVehicle {
    pub name: String,
    pub number: String,
    pub owner: String,
    pub vehicle_type: VehicleType,
    pub registration_date: NaiveDate,
}

/// Trip fields supplied on entry or update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrip {
    pub vehicle_number: String,
    pub fuel_consumption: f64,
    pub trip_date: NaiveDate,
    pub start_location: String,
    pub end_location: String,
    pub lat_start: f64,
    pub lon_start: f64,
    pub lat_end: f64,
    pub lon_end: f64,
    pub distance: f64,
}

impl NewVehicle {
    /// Checks the record and returns it with its text fields trimmed.
    pub fn validate(self) -> Result<Self, String> {
        let vehicle = NewVehicle {
            name: self.name.trim().to_string(),
            number: self.number.trim().to_string(),
            owner: self.owner.trim().to_string(),
            ..self
        };

        check_vehicle_fields(&vehicle.name, &vehicle.number, &vehicle.owner)?;
        Ok(vehicle)
    }

    pub fn into_vehicle(self, vehicle_id: VehicleId) -> Vehicle {
        Vehicle {
            vehicle_id,
            name: self.name,
            number: self.number,
            owner: self.owner,
            vehicle_type: self.vehicle_type,
            registration_date: self.registration_date,
        }
    }
}

impl NewTrip {
    /// Checks the numeric invariants and returns the record with its
    /// vehicle number trimmed.
    pub fn validate(self) -> Result<Self, String> {
        let trip = NewTrip {
            vehicle_number: self.vehicle_number.trim().to_string(),
            ..self
        };

        check_trip_fields(
            &trip.vehicle_number,
            trip.distance,
            trip.fuel_consumption,
            [trip.lat_start, trip.lon_start, trip.lat_end, trip.lon_end],
        )?;
        Ok(trip)
    }

    pub fn into_trip(self, trip_id: TripId) -> Trip {
        Trip {
            trip_id,
            vehicle_number: self.vehicle_number,
            fuel_consumption: self.fuel_consumption,
            trip_date: self.trip_date,
            start_location: self.start_location,
            end_location: self.end_location,
            lat_start: self.lat_start,
            lon_start: self.lon_start,
            lat_end: self.lat_end,
            lon_end: self.lon_end,
            distance: self.distance,
        }
    }
}

impl Vehicle {
    /// Applies the registration rules to a record that was read back from
    /// storage rather than entered through [`NewVehicle`].
    pub fn validate(&self) -> Result<(), String> {
        check_vehicle_fields(&self.name, &self.number, &self.owner)
    }
}

impl Trip {
    /// Applies the entry rules of [`NewTrip::validate`] to a stored record.
    pub fn validate(&self) -> Result<(), String> {
        check_trip_fields(
            &self.vehicle_number,
            self.distance,
            self.fuel_consumption,
            [self.lat_start, self.lon_start, self.lat_end, self.lon_end],
        )
    }
}

fn check_vehicle_fields(name: &str, number: &str, owner: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("vehicle name must not be empty".into());
    }
    if number.trim().is_empty() {
        return Err("vehicle number must not be empty".into());
    }
    if owner.trim().is_empty() {
        return Err("owner name must not be empty".into());
    }
    Ok(())
}

/// `coords` is `[lat_start, lon_start, lat_end, lon_end]`.
fn check_trip_fields(
    vehicle_number: &str,
    distance: f64,
    fuel_consumption: f64,
    coords: [f64; 4],
) -> Result<(), String> {
    let [lat_start, lon_start, lat_end, lon_end] = coords;
    if vehicle_number.trim().is_empty() {
        return Err("vehicle number must not be empty".into());
    }
    check_non_negative("distance", distance)?;
    check_non_negative("fuel_consumption", fuel_consumption)?;
    check_range("lat_start", lat_start, 90.0)?;
    check_range("lat_end", lat_end, 90.0)?;
    check_range("lon_start", lon_start, 180.0)?;
    check_range("lon_end", lon_end, 180.0)?;
    Ok(())
}

fn check_non_negative(field: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{field} must be a finite, non-negative number (got {value})"));
    }
    Ok(())
}

fn check_range(field: &str, value: f64, bound: f64) -> Result<(), String> {
    if !value.is_finite() || value.abs() > bound {
        return Err(format!("{field} must be within [-{bound}, {bound}] (got {value})"));
    }
    Ok(())
}
