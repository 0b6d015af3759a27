//! Presentation-boundary formatting and export.
//!
//! Aggregates are rounded to two decimals here and nowhere else. Renders
//! grouped analytics as JSON and exports any record list as CSV.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::analytics::types::AggregateResult;
use csv::WriterBuilder;
use std::fs::File;

/// Rounds to two decimal places for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// An [`AggregateResult`] rounded for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayAggregate {
    pub total_distance_km: f64,
    pub total_fuel_l: f64,
    pub average_mileage_kmpl: f64,
    pub trips: usize,
}

impl From<&AggregateResult> for DisplayAggregate {
    fn from(r: &AggregateResult) -> Self {
        DisplayAggregate {
            total_distance_km: round2(r.total_distance),
            total_fuel_l: round2(r.total_fuel),
            average_mileage_kmpl: round2(r.average_mileage),
            trips: r.trips,
        }
    }
}

/// One labelled row of rounded analytics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayGroup {
    pub group: String,
    #[serde(flatten)]
    pub stats: DisplayAggregate,
}

/// Rounds each `(label, aggregate)` row and renders the list as pretty JSON.
pub fn render_groups_json(rows: &[(String, AggregateResult)]) -> Result<String> {
    let shown: Vec<DisplayGroup> = rows
        .iter()
        .map(|(group, stats)| DisplayGroup {
            group: group.clone(),
            stats: DisplayAggregate::from(stats),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&shown)?)
}

/// Writes `records` to a new CSV file at `path`, with a header row.
pub fn write_csv<T: Serialize>(path: &str, records: &[T]) -> Result<()> {
    debug!(path, rows = records.len(), "Writing CSV export");

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}
