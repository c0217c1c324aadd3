//! Grouping of raw pickup records into a calendar multi-marker map.

use std::collections::HashMap;

use crate::classify::WasteCategory;
use crate::model::{DateKey, MarkerEntry, RawPickup};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Result of aggregating one batch of raw records.
pub struct Aggregation {
    /// Marker entry per calendar date. No guarantee on key order; each
    /// entry's dot list is in first-seen input order.
    pub markers: HashMap<DateKey, MarkerEntry>,
    /// Number of records skipped because their date was unparsable.
    pub warnings: u32,
}

/// Group raw records by calendar date for multi-marker display.
///
/// Pure function over its input: any order, any size, empty input yields
/// an empty map. Duplicate (date, category) pairs produce a single dot.
/// A record with an unparsable date is skipped and counted as a warning;
/// an unrecognized category degrades to [`WasteCategory::Other`] and is
/// kept.
#[must_use]
pub fn aggregate(records: &[RawPickup]) -> Aggregation {
    let mut markers: HashMap<DateKey, MarkerEntry> = HashMap::new();
    let mut warnings = 0_u32;

    for raw in records {
        let Some(date_key) = DateKey::from_raw(&raw.date) else {
            warnings += 1;
            continue;
        };
        let category = WasteCategory::from_raw(&raw.waste_type);
        markers
            .entry(date_key)
            .or_insert_with(|| MarkerEntry::new(date_key))
            .push_unique(category);
    }

    Aggregation { markers, warnings }
}
