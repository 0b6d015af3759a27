//! Live-tracking simulator: feeds synthetic trips into a record store on a
//! timer, the way a GPS feed would.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use rand::Rng;
use rand::rngs::StdRng;
use std::ops::Range;
use std::time::Duration;
use tracing::{info, warn};

use crate::model::{NewTrip, TripId};
use crate::output::round2;
use crate::store::RecordStore;

/// The fixed route and value ranges a simulated vehicle drives.
#[derive(Debug, Clone)]
pub struct SimulatedRoute {
    pub vehicle_number: String,
    pub start_location: String,
    pub end_location: String,
    pub start: (f64, f64),
    pub end: (f64, f64),
    /// Kilometers.
    pub distance: Range<f64>,
    /// Liters.
    pub fuel: Range<f64>,
}

impl SimulatedRoute {
    /// Jaipur to Churu, roughly 200 km.
    pub fn jaipur_churu(vehicle_number: &str) -> Self {
        Self {
            vehicle_number: vehicle_number.to_string(),
            start_location: "Jaipur".to_string(),
            end_location: "Churu".to_string(),
            start: (26.9124, 75.7873),
            end: (28.3042, 74.7375),
            distance: 180.0..220.0,
            fuel: 2.5..8.5,
        }
    }

    /// Draws one trip on `date`. Distance and fuel are rounded to two
    /// decimals, like a meter reading.
    pub fn sample_trip(&self, rng: &mut impl Rng, date: NaiveDate) -> NewTrip {
        NewTrip {
            vehicle_number: self.vehicle_number.clone(),
            fuel_consumption: round2(rng.gen_range(self.fuel.clone())),
            trip_date: date,
            start_location: self.start_location.clone(),
            end_location: self.end_location.clone(),
            lat_start: self.start.0,
            lon_start: self.start.1,
            lat_end: self.end.0,
            lon_end: self.end.1,
            distance: round2(rng.gen_range(self.distance.clone())),
        }
    }
}

/// Inserts a trip every `interval` until `count` trips were written
/// (`0` runs until the task is cancelled). Returns the inserted ids.
///
/// A failed insert is logged and does not stop the feed.
#[tracing::instrument(skip(store, route, rng), fields(vehicle = %route.vehicle_number))]
pub async fn run(
    store: &dyn RecordStore,
    route: &SimulatedRoute,
    rng: &mut StdRng,
    interval: Duration,
    count: usize,
) -> Result<Vec<TripId>> {
    if count == 0 {
        info!(?interval, "Simulating indefinitely. Press Ctrl+C to stop.");
    } else {
        info!(count, ?interval, "Starting simulated feed");
    }

    let mut inserted = Vec::new();
    let mut attempts = 0usize;

    loop {
        if count > 0 && attempts >= count {
            break;
        }
        attempts += 1;

        let trip = route.sample_trip(rng, Utc::now().date_naive());
        match store.insert_trip(trip).await {
            Ok(trip_id) => {
                info!(trip_id, attempt = attempts, "Simulated trip inserted");
                inserted.push(trip_id);
            }
            Err(e) => warn!(error = %e, attempt = attempts, "Simulated trip rejected"),
        }

        if count == 0 || attempts < count {
            tokio::time::sleep(interval).await;
        }
    }

    info!(inserted = inserted.len(), "Simulated feed finished");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, TripFilter};
    use rand::SeedableRng;

    #[test]
    fn test_sample_trip_within_ranges() {
        let route = SimulatedRoute::jaipur_churu("RJ14XYZ1234");
        let mut rng = StdRng::seed_from_u64(7);
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        for _ in 0..100 {
            let trip = route.sample_trip(&mut rng, date);
            assert!((180.0..=220.0).contains(&trip.distance));
            assert!((2.5..=8.5).contains(&trip.fuel_consumption));
            assert_eq!(trip.vehicle_number, "RJ14XYZ1234");
            assert!(trip.clone().validate().is_ok());
        }
    }

    #[tokio::test]
    async fn test_run_inserts_requested_count() {
        let store = MemoryStore::new();
        let route = SimulatedRoute::jaipur_churu("RJ14XYZ1234");
        let mut rng = StdRng::seed_from_u64(1);

        let ids = run(&store, &route, &mut rng, Duration::from_millis(1), 3)
            .await
            .unwrap();

        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(store.query_trips(&TripFilter::all()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_run_keeps_going_after_rejected_insert() {
        let store = MemoryStore::new();
        let route = SimulatedRoute::jaipur_churu("   ");
        let mut rng = StdRng::seed_from_u64(1);

        let ids = run(&store, &route, &mut rng, Duration::from_millis(1), 2)
            .await
            .unwrap();

        assert!(ids.is_empty());
    }
}
