//! Splitting of raw pickup records into today/upcoming/past views.

use chrono::NaiveDate;

use crate::model::{PickupRecord, RawPickup};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Result of partitioning one batch relative to a reference date.
pub struct Partitions {
    /// Records collected on the reference date, in original input order.
    pub today: Vec<PickupRecord>,
    /// Records strictly after the reference date, ascending by date.
    pub upcoming: Vec<PickupRecord>,
    /// Records strictly before the reference date, ascending by date.
    pub past: Vec<PickupRecord>,
    /// Number of records excluded because their date was unparsable.
    pub warnings: u32,
}

/// Split raw records into today/upcoming/past relative to `reference`.
///
/// Every record with a parsable date lands in exactly one partition.
/// `upcoming` and `past` are sorted ascending by date with a stable sort,
/// so same-date records keep their input order and repeated calls are
/// deterministic. A record with an unparsable date is excluded from all
/// three partitions and counted as a warning, mirroring the aggregator's
/// skip policy. Total function; malformed input degrades to exclusion,
/// never to an error.
#[must_use]
pub fn partition(records: &[RawPickup], reference: NaiveDate) -> Partitions {
    let mut partitions = Partitions::default();

    for raw in records {
        let Some(record) = PickupRecord::from_raw(raw) else {
            partitions.warnings += 1;
            continue;
        };
        if record.date == reference {
            partitions.today.push(record);
        } else if record.date > reference {
            partitions.upcoming.push(record);
        } else {
            partitions.past.push(record);
        }
    }

    partitions.upcoming.sort_by_key(|record| record.date);
    partitions.past.sort_by_key(|record| record.date);

    partitions
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::partition;
    use crate::classify::WasteCategory;
    use crate::model::RawPickup;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
    }

    #[test]
    fn empty_input_yields_three_empty_partitions() {
        let partitions = partition(&[], reference());
        assert!(partitions.today.is_empty());
        assert!(partitions.upcoming.is_empty());
        assert!(partitions.past.is_empty());
        assert_eq!(partitions.warnings, 0);
    }

    #[test]
    fn each_record_lands_in_exactly_one_partition() {
        let records = vec![
            RawPickup::new("2024-06-01", "Papir"),
            RawPickup::new("2024-06-02", "Bio"),
            RawPickup::new("2024-06-02", "Plastika"),
            RawPickup::new("2024-06-03", "Komunalni"),
        ];
        let partitions = partition(&records, reference());

        let total = partitions.today.len() + partitions.upcoming.len() + partitions.past.len();
        assert_eq!(total, records.len());
        assert_eq!(partitions.today.len(), 2);
        assert_eq!(partitions.upcoming.len(), 1);
        assert_eq!(partitions.past.len(), 1);
    }

    #[test]
    fn upcoming_is_sorted_ascending() {
        let records = vec![
            RawPickup::new("2024-06-03", "Papir"),
            RawPickup::new("2024-06-01", "Bio"),
            RawPickup::new("2024-06-02", "Plastika"),
        ];
        let start = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        let partitions = partition(&records, start);

        let categories: Vec<&WasteCategory> = partitions
            .upcoming
            .iter()
            .map(|record| &record.category)
            .collect();
        assert_eq!(
            categories,
            [
                &WasteCategory::Bio,
                &WasteCategory::Plastic,
                &WasteCategory::Paper,
            ]
        );
    }

    #[test]
    fn same_date_ties_keep_input_order() {
        let records = vec![
            RawPickup::new("2024-06-05", "Komunalni"),
            RawPickup::new("2024-06-04", "Papir"),
            RawPickup::new("2024-06-05", "Bio"),
            RawPickup::new("2024-06-05", "Plastika"),
        ];
        let partitions = partition(&records, reference());

        let categories: Vec<&WasteCategory> = partitions
            .upcoming
            .iter()
            .map(|record| &record.category)
            .collect();
        assert_eq!(
            categories,
            [
                &WasteCategory::Paper,
                &WasteCategory::General,
                &WasteCategory::Bio,
                &WasteCategory::Plastic,
            ]
        );
    }

    #[test]
    fn today_preserves_input_order() {
        let records = vec![
            RawPickup::new("2024-06-02", "Plastika"),
            RawPickup::new("2024-06-02", "Papir"),
            RawPickup::new("2024-06-02", "Bio"),
        ];
        let partitions = partition(&records, reference());

        let categories: Vec<&WasteCategory> = partitions
            .today
            .iter()
            .map(|record| &record.category)
            .collect();
        assert_eq!(
            categories,
            [
                &WasteCategory::Plastic,
                &WasteCategory::Paper,
                &WasteCategory::Bio,
            ]
        );
    }

    #[test]
    fn one_bad_date_out_of_five_yields_four_records_and_one_warning() {
        let records = vec![
            RawPickup::new("2024-06-01", "Papir"),
            RawPickup::new("not-a-date", "Bio"),
            RawPickup::new("2024-06-02", "Plastika"),
            RawPickup::new("2024-06-03", "Komunalni"),
            RawPickup::new("2024-06-04", "Bio"),
        ];
        let partitions = partition(&records, reference());

        let total = partitions.today.len() + partitions.upcoming.len() + partitions.past.len();
        assert_eq!(total, 4);
        assert_eq!(partitions.warnings, 1);
    }

    #[test]
    fn partitioning_is_deterministic() {
        let records = vec![
            RawPickup::new("2024-06-05", "Papir"),
            RawPickup::new("2024-06-05", "Bio"),
            RawPickup::new("2024-05-30", "Plastika"),
            RawPickup::new("garbage", "Komunalni"),
        ];
        assert_eq!(
            partition(&records, reference()),
            partition(&records, reference())
        );
    }
}
