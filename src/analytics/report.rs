use crate::analytics::aggregate::{
    aggregate_by_group, aggregate_fleet, by_day, by_vehicle, sorted_entries, summarize_vehicles,
};
use crate::analytics::types::FleetReport;
use crate::store::{RecordStore, TripFilter};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Takes one snapshot of the store and aggregates it into a [`FleetReport`].
///
/// Vehicle summaries always cover every registered vehicle; `filter` only
/// narrows the trips that feed the totals.
#[tracing::instrument(skip(store))]
pub async fn build_report(store: &dyn RecordStore, filter: &TripFilter) -> Result<FleetReport> {
    let trips = store
        .query_trips(filter)
        .await
        .context("failed to load trips")?;
    let vehicles = store
        .query_vehicles()
        .await
        .context("failed to load vehicles")?;

    let fleet = aggregate_fleet(&trips);
    let by_vehicle = sorted_entries(aggregate_by_group(&trips, by_vehicle));
    let by_day = sorted_entries(aggregate_by_group(&trips, by_day));
    let vehicles = summarize_vehicles(&vehicles, &trips);

    info!(
        trips = trips.len(),
        vehicles = vehicles.len(),
        days = by_day.len(),
        "Report built"
    );

    Ok(FleetReport {
        generated_at: Utc::now(),
        fleet,
        by_vehicle,
        by_day,
        vehicles,
    })
}

/// Serializes a value as pretty JSON into the file at `path`, creating
/// parent directories as needed.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let body = serde_json::to_vec_pretty(value)?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))?;

    info!(path = %path.display(), "Report written");
    Ok(())
}
