use crate::model::{NewTrip, NewVehicle, Trip, TripId, Vehicle, VehicleId};
use crate::store::{StoreError, TripFilter};

/// The two record tables and the write rules both stores share.
///
/// `trip_seq` and `vehicle_seq` are the highest ids ever handed out. New ids
/// continue from them, so an id freed by a delete is never assigned again.
#[derive(Debug, Default, Clone)]
pub(crate) struct Tables {
    pub(crate) vehicles: Vec<Vehicle>,
    pub(crate) trips: Vec<Trip>,
    pub(crate) trip_seq: TripId,
    pub(crate) vehicle_seq: VehicleId,
}

impl Tables {
    pub(crate) fn query_trips(&self, filter: &TripFilter) -> Vec<Trip> {
        filter.apply(&self.trips)
    }

    pub(crate) fn insert_trip(&mut self, trip: NewTrip) -> Result<TripId, StoreError> {
        let trip = trip.validate().map_err(StoreError::Validation)?;
        let highest = self.trips.iter().map(|t| t.trip_id).max().unwrap_or(0);
        let trip_id = self.trip_seq.max(highest) + 1;
        self.trip_seq = trip_id;
        self.trips.push(trip.into_trip(trip_id));
        Ok(trip_id)
    }

    pub(crate) fn update_trip(&mut self, trip_id: TripId, trip: NewTrip) -> Result<(), StoreError> {
        let trip = trip.validate().map_err(StoreError::Validation)?;
        let slot = self
            .trips
            .iter_mut()
            .find(|t| t.trip_id == trip_id)
            .ok_or_else(|| StoreError::NotFound(format!("trip {trip_id}")))?;
        *slot = trip.into_trip(trip_id);
        Ok(())
    }

    pub(crate) fn delete_trip(&mut self, trip_id: TripId) -> Result<(), StoreError> {
        let before = self.trips.len();
        self.trips.retain(|t| t.trip_id != trip_id);
        if self.trips.len() == before {
            return Err(StoreError::NotFound(format!("trip {trip_id}")));
        }
        Ok(())
    }

    pub(crate) fn insert_vehicle(&mut self, vehicle: NewVehicle) -> Result<VehicleId, StoreError> {
        let vehicle = vehicle.validate().map_err(StoreError::Validation)?;
        self.ensure_number_free(&vehicle.number, None)?;
        let highest = self.vehicles.iter().map(|v| v.vehicle_id).max().unwrap_or(0);
        let vehicle_id = self.vehicle_seq.max(highest) + 1;
        self.vehicle_seq = vehicle_id;
        self.vehicles.push(vehicle.into_vehicle(vehicle_id));
        Ok(vehicle_id)
    }

    pub(crate) fn update_vehicle(
        &mut self,
        vehicle_id: VehicleId,
        vehicle: NewVehicle,
    ) -> Result<(), StoreError> {
        let vehicle = vehicle.validate().map_err(StoreError::Validation)?;
        self.ensure_number_free(&vehicle.number, Some(vehicle_id))?;
        let slot = self
            .vehicles
            .iter_mut()
            .find(|v| v.vehicle_id == vehicle_id)
            .ok_or_else(|| StoreError::NotFound(format!("vehicle {vehicle_id}")))?;
        *slot = vehicle.into_vehicle(vehicle_id);
        Ok(())
    }

    pub(crate) fn delete_vehicle(&mut self, vehicle_id: VehicleId) -> Result<(), StoreError> {
        let before = self.vehicles.len();
        self.vehicles.retain(|v| v.vehicle_id != vehicle_id);
        if self.vehicles.len() == before {
            return Err(StoreError::NotFound(format!("vehicle {vehicle_id}")));
        }
        Ok(())
    }

    fn ensure_number_free(&self, number: &str, except: Option<VehicleId>) -> Result<(), StoreError> {
        let taken = self
            .vehicles
            .iter()
            .any(|v| v.number == number && Some(v.vehicle_id) != except);
        if taken {
            return Err(StoreError::DuplicateVehicleNumber(number.to_string()));
        }
        Ok(())
    }
}
