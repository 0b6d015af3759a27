use crate::analytics::types::{AggregateResult, GroupEntry, TripTotals, VehicleSummary, YearMonth};
use crate::model::{Trip, TripId, Vehicle};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::hash::Hash;

/// Aggregates every trip in the snapshot into one fleet-wide result.
///
/// An empty snapshot yields all zeros, and a snapshot with no recorded fuel
/// yields a mileage of zero.
pub fn aggregate_fleet(trips: &[Trip]) -> AggregateResult {
    let mut totals = TripTotals::default();
    for trip in trips {
        totals.push(trip);
    }
    totals.finish()
}

/// Aggregates trips per distinct key returned by `group_key`.
///
/// Only keys observed in the input produce an entry. The map has no defined
/// order; use [`sorted_entries`] when a stable listing is needed.
pub fn aggregate_by_group<K, F>(trips: &[Trip], group_key: F) -> HashMap<K, AggregateResult>
where
    K: Eq + Hash,
    F: Fn(&Trip) -> K,
{
    let mut groups: HashMap<K, TripTotals> = HashMap::new();

    for trip in trips {
        groups.entry(group_key(trip)).or_default().push(trip);
    }

    groups.into_iter().map(|(k, t)| (k, t.finish())).collect()
}

/// Like [`aggregate_by_group`], for key extractors that can fail.
///
/// Stops at the first trip whose key cannot be derived and returns that
/// error unchanged, so a bad record never silently falls out of the totals.
pub fn try_aggregate_by_group<K, E, F>(
    trips: &[Trip],
    group_key: F,
) -> Result<HashMap<K, AggregateResult>, E>
where
    K: Eq + Hash,
    F: Fn(&Trip) -> Result<K, E>,
{
    let mut groups: HashMap<K, TripTotals> = HashMap::new();

    for trip in trips {
        groups.entry(group_key(trip)?).or_default().push(trip);
    }

    Ok(groups.into_iter().map(|(k, t)| (k, t.finish())).collect())
}

pub fn by_vehicle(trip: &Trip) -> String {
    trip.vehicle_number.clone()
}

pub fn by_trip(trip: &Trip) -> TripId {
    trip.trip_id
}

pub fn by_day(trip: &Trip) -> NaiveDate {
    trip.trip_date
}

pub fn by_month(trip: &Trip) -> YearMonth {
    YearMonth::from(trip.trip_date)
}

/// Orders a grouped result by its keys' natural order.
pub fn sorted_entries<K: Ord>(groups: HashMap<K, AggregateResult>) -> Vec<GroupEntry<K>> {
    let mut entries: Vec<_> = groups
        .into_iter()
        .map(|(key, stats)| GroupEntry { key, stats })
        .collect();
    entries.sort_by(|a, b| a.key.cmp(&b.key));
    entries
}

/// Builds one summary per registered vehicle, in the order given.
///
/// Vehicles without trips report zero trips and zero distance. Trips whose
/// vehicle number matches no registered vehicle do not appear here.
pub fn summarize_vehicles(vehicles: &[Vehicle], trips: &[Trip]) -> Vec<VehicleSummary> {
    let per_vehicle = aggregate_by_group(trips, by_vehicle);

    vehicles
        .iter()
        .map(|v| {
            let stats = per_vehicle.get(&v.number).copied().unwrap_or_default();
            VehicleSummary {
                vehicle_id: v.vehicle_id,
                vehicle_name: v.name.clone(),
                vehicle_number: v.number.clone(),
                owner_name: v.owner.clone(),
                vehicle_type: v.vehicle_type,
                registration_date: v.registration_date,
                total_trips: stats.trips,
                total_distance: stats.total_distance,
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::VehicleType;

    const EPS: f64 = 1e-9;

    pub(crate) fn trip(id: TripId, vehicle: &str, distance: f64, fuel: f64, date: &str) -> Trip {
        Trip {
            trip_id: id,
            vehicle_number: vehicle.to_string(),
            fuel_consumption: fuel,
            trip_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            start_location: "Jaipur".to_string(),
            end_location: "Churu".to_string(),
            lat_start: 26.9124,
            lon_start: 75.7873,
            lat_end: 28.3042,
            lon_end: 74.7375,
            distance,
        }
    }

    fn vehicle(id: u64, number: &str) -> Vehicle {
        Vehicle {
            vehicle_id: id,
            name: format!("Vehicle {id}"),
            number: number.to_string(),
            owner: "Mayank".to_string(),
            vehicle_type: VehicleType::Truck,
            registration_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_fleet_two_trips() {
        let trips = vec![
            trip(1, "A", 100.0, 10.0, "2025-01-01"),
            trip(2, "A", 50.0, 5.0, "2025-01-02"),
        ];
        let result = aggregate_fleet(&trips);

        assert_eq!(result.total_distance, 150.0);
        assert_eq!(result.total_fuel, 15.0);
        assert_eq!(result.average_mileage, 10.0);
        assert_eq!(result.trips, 2);
    }

    #[test]
    fn test_fleet_empty_is_all_zero() {
        let result = aggregate_fleet(&[]);

        assert_eq!(result, AggregateResult::default());
        assert_eq!(result.total_distance, 0.0);
        assert_eq!(result.total_fuel, 0.0);
        assert_eq!(result.average_mileage, 0.0);
    }

    #[test]
    fn test_zero_fuel_mileage_is_zero() {
        let trips = vec![trip(1, "A", 20.0, 0.0, "2025-01-01")];
        let result = aggregate_fleet(&trips);

        assert_eq!(result.total_distance, 20.0);
        assert_eq!(result.average_mileage, 0.0);
        assert!(result.average_mileage.is_finite());
    }

    #[test]
    fn test_additivity_over_partition() {
        let trips: Vec<Trip> = (1..=50)
            .map(|i| trip(i, "A", i as f64 * 1.1, i as f64 * 0.07, "2025-01-01"))
            .collect();
        let (left, right) = trips.split_at(17);

        let whole = aggregate_fleet(&trips);
        let a = aggregate_fleet(left);
        let b = aggregate_fleet(right);

        assert!((a.total_distance + b.total_distance - whole.total_distance).abs() < EPS);
        assert!((a.total_fuel + b.total_fuel - whole.total_fuel).abs() < EPS);
        assert_eq!(a.trips + b.trips, whole.trips);
    }

    #[test]
    fn test_fleet_is_idempotent() {
        let trips = vec![
            trip(1, "A", 12.3, 1.7, "2025-01-01"),
            trip(2, "B", 45.6, 3.2, "2025-01-02"),
        ];
        assert_eq!(aggregate_fleet(&trips), aggregate_fleet(&trips));
    }

    #[test]
    fn test_group_by_vehicle() {
        let trips = vec![
            trip(1, "A", 100.0, 10.0, "2025-01-01"),
            trip(2, "B", 40.0, 8.0, "2025-01-01"),
        ];
        let groups = aggregate_by_group(&trips, by_vehicle);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["A"].total_distance, 100.0);
        assert_eq!(groups["A"].total_fuel, 10.0);
        assert_eq!(groups["A"].average_mileage, 10.0);
        assert_eq!(groups["B"].total_distance, 40.0);
        assert_eq!(groups["B"].total_fuel, 8.0);
        assert_eq!(groups["B"].average_mileage, 5.0);
    }

    #[test]
    fn test_group_completeness() {
        let trips = vec![
            trip(1, "A", 10.0, 1.0, "2025-01-01"),
            trip(2, "B", 20.0, 2.0, "2025-01-01"),
            trip(3, "A", 30.0, 3.0, "2025-01-02"),
            trip(4, "C", 40.0, 4.0, "2025-01-03"),
            trip(5, "A", 50.0, 5.0, "2025-01-03"),
        ];
        let groups = aggregate_by_group(&trips, by_vehicle);

        assert_eq!(groups.len(), 3);
        for (number, stats) in &groups {
            let expected: f64 = trips
                .iter()
                .filter(|t| &t.vehicle_number == number)
                .map(|t| t.distance)
                .sum();
            assert!((stats.total_distance - expected).abs() < EPS);
        }
        assert_eq!(groups["A"].trips, 3);
    }

    #[test]
    fn test_group_empty_input_has_no_groups() {
        assert!(aggregate_by_group(&[], by_vehicle).is_empty());
    }

    #[test]
    fn test_group_by_trip_has_one_entry_per_trip() {
        let trips = vec![
            trip(7, "A", 10.0, 1.0, "2025-01-01"),
            trip(9, "A", 20.0, 0.0, "2025-01-01"),
        ];
        let groups = aggregate_by_group(&trips, by_trip);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&7].average_mileage, 10.0);
        assert_eq!(groups[&9].average_mileage, 0.0);
    }

    #[test]
    fn test_group_by_month_sorted() {
        let trips = vec![
            trip(1, "A", 10.0, 1.0, "2025-02-14"),
            trip(2, "A", 20.0, 2.0, "2025-01-03"),
            trip(3, "B", 30.0, 3.0, "2025-01-30"),
        ];
        let entries = sorted_entries(aggregate_by_group(&trips, by_month));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key.to_string(), "2025-01");
        assert_eq!(entries[0].stats.total_distance, 50.0);
        assert_eq!(entries[1].key.to_string(), "2025-02");
    }

    #[test]
    fn test_try_group_propagates_first_key_error() {
        let trips = vec![
            trip(1, "A", 10.0, 1.0, "2025-01-01"),
            trip(2, "", 20.0, 2.0, "2025-01-01"),
        ];
        let result = try_aggregate_by_group(&trips, |t| {
            if t.vehicle_number.is_empty() {
                Err(format!("trip {} has no vehicle number", t.trip_id))
            } else {
                Ok(t.vehicle_number.clone())
            }
        });

        assert_eq!(result.unwrap_err(), "trip 2 has no vehicle number");
    }

    #[test]
    fn test_try_group_matches_infallible_on_success() {
        let trips = vec![
            trip(1, "A", 10.0, 1.0, "2025-01-01"),
            trip(2, "B", 20.0, 2.0, "2025-01-01"),
        ];
        let fallible =
            try_aggregate_by_group(&trips, |t| Ok::<_, String>(by_vehicle(t))).unwrap();
        assert_eq!(fallible, aggregate_by_group(&trips, by_vehicle));
    }

    #[test]
    fn test_summarize_vehicles_left_join() {
        let vehicles = vec![vehicle(1, "A"), vehicle(2, "IDLE")];
        let trips = vec![
            trip(1, "A", 10.0, 1.0, "2025-01-01"),
            trip(2, "A", 15.0, 1.0, "2025-01-02"),
            trip(3, "ORPHAN", 99.0, 9.0, "2025-01-02"),
        ];
        let summaries = summarize_vehicles(&vehicles, &trips);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].vehicle_number, "A");
        assert_eq!(summaries[0].total_trips, 2);
        assert_eq!(summaries[0].total_distance, 25.0);
        assert_eq!(summaries[1].vehicle_number, "IDLE");
        assert_eq!(summaries[1].total_trips, 0);
        assert_eq!(summaries[1].total_distance, 0.0);
    }
}
