use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::tables::Tables;
use super::{RecordStore, StoreError, TripFilter};
use crate::model::{NewTrip, NewVehicle, Trip, TripId, Vehicle, VehicleId};

/// Keeps vehicles and trips in process memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn query_trips(&self, filter: &TripFilter) -> Result<Vec<Trip>, StoreError> {
        Ok(self.tables.lock().await.query_trips(filter))
    }

    async fn query_vehicles(&self) -> Result<Vec<Vehicle>, StoreError> {
        Ok(self.tables.lock().await.vehicles.clone())
    }

    async fn insert_trip(&self, trip: NewTrip) -> Result<TripId, StoreError> {
        let trip_id = self.tables.lock().await.insert_trip(trip)?;
        debug!(trip_id, "Trip inserted");
        Ok(trip_id)
    }

    async fn update_trip(&self, trip_id: TripId, trip: NewTrip) -> Result<(), StoreError> {
        self.tables.lock().await.update_trip(trip_id, trip)
    }

    async fn delete_trip(&self, trip_id: TripId) -> Result<(), StoreError> {
        self.tables.lock().await.delete_trip(trip_id)
    }

    async fn insert_vehicle(&self, vehicle: NewVehicle) -> Result<VehicleId, StoreError> {
        let vehicle_id = self.tables.lock().await.insert_vehicle(vehicle)?;
        debug!(vehicle_id, "Vehicle inserted");
        Ok(vehicle_id)
    }

    async fn update_vehicle(
        &self,
        vehicle_id: VehicleId,
        vehicle: NewVehicle,
    ) -> Result<(), StoreError> {
        self.tables.lock().await.update_vehicle(vehicle_id, vehicle)
    }

    async fn delete_vehicle(&self, vehicle_id: VehicleId) -> Result<(), StoreError> {
        self.tables.lock().await.delete_vehicle(vehicle_id)
    }
}
