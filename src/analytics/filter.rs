use crate::model::Trip;
use chrono::NaiveDate;

/// Text fields of a [`Trip`] that can be searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    VehicleNumber,
    StartLocation,
    EndLocation,
}

impl TextField {
    pub fn select(self, trip: &Trip) -> &str {
        match self {
            TextField::VehicleNumber => &trip.vehicle_number,
            TextField::StartLocation => &trip.start_location,
            TextField::EndLocation => &trip.end_location,
        }
    }
}

/// Keeps trips dated within `start..=end`. An inverted range keeps nothing.
pub fn filter_by_date_range(trips: &[Trip], start: NaiveDate, end: NaiveDate) -> Vec<Trip> {
    if start > end {
        return Vec::new();
    }

    trips
        .iter()
        .filter(|t| (start..=end).contains(&t.trip_date))
        .cloned()
        .collect()
}

/// Keeps trips whose `field` contains `needle`, ignoring case.
/// An empty needle keeps everything.
pub fn filter_by_text(trips: &[Trip], field: TextField, needle: &str) -> Vec<Trip> {
    if needle.is_empty() {
        return trips.to_vec();
    }

    let needle = needle.to_lowercase();
    trips
        .iter()
        .filter(|t| contains_ignore_case(field.select(t), &needle))
        .cloned()
        .collect()
}

/// Case-insensitive substring test. `needle` must already be lowercase.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
