//! Domain data structures for municipalities, pickup records, and settings.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::classify::WasteCategory;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a municipality known to odvoz.
pub struct MunicipalityId(pub String);

impl fmt::Display for MunicipalityId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Metadata describing a municipality and its human-friendly name.
pub struct MunicipalityMeta {
    /// Unique identifier.
    pub id: MunicipalityId,
    /// Localized display name.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Pickup record as delivered by a provider, before any validation.
///
/// The engine only requires that each record is reducible to a date-like
/// string and a category-like string; everything else is provider detail.
pub struct RawPickup {
    /// Date-like string, ideally `YYYY-MM-DD` but possibly carrying a
    /// time-of-day or timezone suffix.
    pub date: String,
    /// Category-like string such as `Papir` or `Bio`.
    pub waste_type: String,
}

impl RawPickup {
    /// Construct a raw record from string-like parts.
    #[must_use]
    pub fn new<D: Into<String>, W: Into<String>>(date: D, waste_type: W) -> Self {
        Self {
            date: date.into(),
            waste_type: waste_type.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Canonical `YYYY-MM-DD` grouping key for a calendar date.
///
/// All grouping and equality checks go through this key rather than raw
/// payload strings, so upstream records with time-of-day or timezone
/// suffixes still land on the same calendar day.
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Canonicalize a raw date-like string into a key.
    ///
    /// Accepts plain `YYYY-MM-DD`, RFC 3339 timestamps, and strings whose
    /// leading segment (before `T` or a space) is a plain date. Returns
    /// `None` for anything else.
    #[must_use]
    pub fn from_raw(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Some(Self(date));
        }
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
            return Some(Self(timestamp.date_naive()));
        }
        let head = trimmed.split(['T', ' ']).next()?;
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok().map(Self)
    }

    /// Key for an already-parsed calendar date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The calendar date behind this key.
    #[must_use]
    pub fn date(self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0.format("%Y-%m-%d"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Validated pickup record: one waste category collected on one date.
///
/// Immutable once constructed; owned by the batch that produced it.
pub struct PickupRecord {
    /// Date of the pickup (no time component).
    pub date: NaiveDate,
    /// Category of waste collected.
    pub category: WasteCategory,
}

impl PickupRecord {
    /// Validate a raw record.
    ///
    /// An unrecognized category degrades to [`WasteCategory::Other`]; an
    /// unparsable date makes the whole record invalid and yields `None`.
    #[must_use]
    pub fn from_raw(raw: &RawPickup) -> Option<Self> {
        let key = DateKey::from_raw(&raw.date)?;
        Some(Self {
            date: key.date(),
            category: WasteCategory::from_raw(&raw.waste_type),
        })
    }

    /// Grouping key for this record's date.
    #[must_use]
    pub fn date_key(&self) -> DateKey {
        DateKey::from_date(self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Categories observed for one calendar date, for multi-dot calendar display.
pub struct MarkerEntry {
    /// Date the entry belongs to.
    pub date_key: DateKey,
    /// Categories in first-seen input order, one dot per category.
    dots: Vec<WasteCategory>,
}

impl MarkerEntry {
    /// Create an empty entry for the given date.
    #[must_use]
    pub fn new(date_key: DateKey) -> Self {
        Self {
            date_key,
            dots: Vec::new(),
        }
    }

    /// Append a category unless it is already present for this date.
    pub fn push_unique(&mut self, category: WasteCategory) {
        if !self.dots.contains(&category) {
            self.dots.push(category);
        }
    }

    /// Categories in insertion order.
    #[must_use]
    pub fn dots(&self) -> &[WasteCategory] {
        &self.dots
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// When a pickup reminder should fire relative to the pickup date.
pub enum NotifyBefore {
    /// On the morning of the pickup itself.
    OnDay,
    /// On the evening of the previous day.
    DayBefore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// User preferences persisted by a [`crate::ports::SettingsStore`].
///
/// The engine only reads `selected_municipality_id`; the notification
/// fields belong to the presentation and notification layers.
pub struct Settings {
    /// Municipality to auto-select at startup, if previously chosen.
    pub selected_municipality_id: Option<MunicipalityId>,
    /// Whether pickup reminders are enabled at all.
    pub notifications_enabled: bool,
    /// Local time of day at which reminders fire.
    pub notification_time: NaiveTime,
    /// Reminder timing relative to the pickup date.
    pub notify_before: NotifyBefore,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            selected_municipality_id: None,
            notifications_enabled: false,
            notification_time: NaiveTime::from_hms_opt(7, 0, 0).expect("valid constant time"),
            notify_before: NotifyBefore::OnDay,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{DateKey, PickupRecord, RawPickup};
    use crate::classify::WasteCategory;

    #[test]
    fn date_key_accepts_plain_dates() {
        let key = DateKey::from_raw("2024-05-01").unwrap();
        assert_eq!(key.to_string(), "2024-05-01");
        assert_eq!(key.date(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn date_key_tolerates_time_and_timezone_suffixes() {
        let from_rfc3339 = DateKey::from_raw("2024-05-01T00:00:00.000Z").unwrap();
        let from_space = DateKey::from_raw("2024-05-01 06:30").unwrap();
        let plain = DateKey::from_raw(" 2024-05-01 ").unwrap();
        assert_eq!(from_rfc3339, plain);
        assert_eq!(from_space, plain);
    }

    #[test]
    fn date_key_rejects_garbage() {
        assert!(DateKey::from_raw("not-a-date").is_none());
        assert!(DateKey::from_raw("").is_none());
        assert!(DateKey::from_raw("2024-13-40").is_none());
    }

    #[test]
    fn record_validation_degrades_category_but_not_date() {
        let odd_category = RawPickup::new("2024-05-01", "Stiropor");
        let record = PickupRecord::from_raw(&odd_category).unwrap();
        assert_eq!(record.category, WasteCategory::Other("Stiropor".to_owned()));

        let bad_date = RawPickup::new("someday", "Bio");
        assert!(PickupRecord::from_raw(&bad_date).is_none());
    }
}
