//! Grouping of lookup results by day and status.

use std::collections::btree_map::{self, BTreeMap};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::models::{CaseStatus, LookupResult};

/// Human-readable day label, e.g. "January 3, 2023".
pub const DATE_LABEL_FORMAT: &str = "%B %-d, %Y";

/// Aggregation key. Orders by day, then by status declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    pub day: NaiveDate,
    pub status: CaseStatus,
}

impl BucketKey {
    pub fn for_result(result: &LookupResult) -> Self {
        Self {
            day: result.occurred_at.date_naive(),
            status: result.status,
        }
    }

    pub fn date_label(&self) -> String {
        self.day.format(DATE_LABEL_FORMAT).to_string()
    }
}

/// One (day, status) cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket<'a> {
    pub count: usize,
    pub members: Vec<&'a LookupResult>,
    /// First member's timestamp truncated to the day.
    pub timestamp: DateTime<Utc>,
}

impl<'a> Bucket<'a> {
    fn new(first: &'a LookupResult) -> Self {
        Self {
            count: 0,
            members: Vec::new(),
            timestamp: day_start(first.occurred_at),
        }
    }

    pub fn unix_time(&self) -> i64 {
        self.timestamp.timestamp()
    }
}

/// Midnight UTC of the day containing `at`.
pub fn day_start(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Buckets built from one pass over the results. Iterates chronologically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation<'a> {
    buckets: BTreeMap<BucketKey, Bucket<'a>>,
}

impl<'a> Aggregation<'a> {
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn get(&self, key: &BucketKey) -> Option<&Bucket<'a>> {
        self.buckets.get(key)
    }

    /// Buckets by ascending timestamp, ties broken by status order.
    pub fn iter(&self) -> btree_map::Iter<'_, BucketKey, Bucket<'a>> {
        self.buckets.iter()
    }

    /// Buckets grouped under their day, chronologically.
    pub fn by_day(&self) -> Vec<(NaiveDate, Vec<(&BucketKey, &Bucket<'a>)>)> {
        let mut days: Vec<(NaiveDate, Vec<(&BucketKey, &Bucket<'a>)>)> = Vec::new();
        for (key, bucket) in &self.buckets {
            match days.last_mut() {
                Some((day, entries)) if *day == key.day => entries.push((key, bucket)),
                _ => days.push((key.day, vec![(key, bucket)])),
            }
        }
        days
    }

    /// Total count per status across all days, in status order.
    pub fn status_totals(&self) -> BTreeMap<CaseStatus, usize> {
        let mut totals = BTreeMap::new();
        for (key, bucket) in &self.buckets {
            *totals.entry(key.status).or_insert(0) += bucket.count;
        }
        totals
    }

    pub fn total(&self) -> usize {
        self.buckets.values().map(|b| b.count).sum()
    }
}

/// Group results into (day, status) buckets.
pub fn group(results: &[LookupResult]) -> Aggregation<'_> {
    let mut buckets: BTreeMap<BucketKey, Bucket<'_>> = BTreeMap::new();
    for result in results {
        let bucket = buckets
            .entry(BucketKey::for_result(result))
            .or_insert_with(|| Bucket::new(result));
        bucket.members.push(result);
        bucket.count += 1;
    }
    Aggregation { buckets }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::Identifier;

    fn result(id: &str, status: CaseStatus, y: i32, m: u32, d: u32, h: u32) -> LookupResult {
        LookupResult {
            id: Identifier::from(id),
            status,
            occurred_at: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
            raw_heading: String::new(),
            raw_text: String::new(),
        }
    }

    fn sample() -> Vec<LookupResult> {
        vec![
            result("A1", CaseStatus::CardIssued, 2023, 3, 2, 0),
            result("A2", CaseStatus::ReceiptNotice, 2023, 1, 5, 0),
            result("A3", CaseStatus::CardIssued, 2023, 3, 2, 0),
            result("A4", CaseStatus::BiometricsScheduled, 2023, 3, 2, 0),
            result("A5", CaseStatus::TransportFailed, 2024, 6, 1, 17),
            result("A6", CaseStatus::ReceiptNotice, 2023, 1, 5, 0),
        ]
    }

    #[test]
    fn test_counts_sum_to_input_and_members_are_disjoint() {
        let results = sample();
        let agg = group(&results);

        assert_eq!(agg.total(), results.len());
        let mut seen: Vec<&str> = agg
            .iter()
            .flat_map(|(_, b)| b.members.iter().map(|r| r.id.as_str()))
            .collect();
        seen.sort();
        assert_eq!(seen, vec!["A1", "A2", "A3", "A4", "A5", "A6"]);
        assert!(agg.iter().all(|(_, b)| b.count == b.members.len()));
    }

    #[test]
    fn test_iteration_is_chronological_with_status_tiebreak() {
        let results = sample();
        let agg = group(&results);

        let timestamps: Vec<i64> = agg.iter().map(|(_, b)| b.unix_time()).collect();
        assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));

        let keys: Vec<(NaiveDate, CaseStatus)> = agg.iter().map(|(k, _)| (k.day, k.status)).collect();
        assert_eq!(
            keys,
            vec![
                (NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(), CaseStatus::ReceiptNotice),
                (NaiveDate::from_ymd_opt(2023, 3, 2).unwrap(), CaseStatus::BiometricsScheduled),
                (NaiveDate::from_ymd_opt(2023, 3, 2).unwrap(), CaseStatus::CardIssued),
                (NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), CaseStatus::TransportFailed),
            ]
        );
    }

    #[test]
    fn test_bucket_timestamp_is_day_truncated() {
        let results = sample();
        let agg = group(&results);
        let key = BucketKey {
            day: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            status: CaseStatus::TransportFailed,
        };
        let bucket = agg.get(&key).unwrap();
        assert_eq!(
            bucket.timestamp,
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(key.date_label(), "June 1, 2024");
    }

    #[test]
    fn test_by_day_and_totals() {
        let results = sample();
        let agg = group(&results);

        let days = agg.by_day();
        assert_eq!(days.len(), 3);
        assert_eq!(days[1].1.len(), 2);

        let totals = agg.status_totals();
        assert_eq!(totals[&CaseStatus::CardIssued], 2);
        assert_eq!(totals[&CaseStatus::ReceiptNotice], 2);
        assert_eq!(totals.values().sum::<usize>(), 6);
    }

    #[test]
    fn test_empty_input() {
        let agg = group(&[]);
        assert!(agg.is_empty());
        assert_eq!(agg.total(), 0);
        assert!(agg.by_day().is_empty());
    }
}
