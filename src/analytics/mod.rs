//! Trip aggregation and filtering.
//!
//! Every function here is a pure computation over a `&[Trip]` snapshot:
//! fleet totals, totals grouped by an arbitrary key, date-range and text
//! filters. [`report`] ties them to a [`crate::store::RecordStore`] and
//! writes the result as JSON.

pub mod aggregate;
pub mod filter;
pub mod report;
pub mod types;
pub mod utility;

pub use aggregate::{aggregate_by_group, aggregate_fleet, try_aggregate_by_group};
pub use filter::{TextField, filter_by_date_range, filter_by_text};
pub use types::AggregateResult;
