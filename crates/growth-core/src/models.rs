use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current on-disk version of series documents. Files written before the
/// field existed are read as version 1.
pub const SERIES_SCHEMA_VERSION: u32 = 1;

/// One observation of a metric family. `count` holds a number for counted
/// families and the tag string for release versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRecord<V> {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub count: V,
}

/// Append-only, chronologically ordered observations of one family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSeries<V> {
    records: Vec<MetricRecord<V>>,
}

impl<V> Default for MetricSeries<V> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<V> MetricSeries<V> {
    pub fn from_records(records: Vec<MetricRecord<V>>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[MetricRecord<V>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&MetricRecord<V>> {
        self.records.last()
    }

    pub fn current(&self) -> Option<&V> {
        self.records.last().map(|record| &record.count)
    }

    /// `1` for an empty series, otherwise one past the largest id seen.
    pub fn next_id(&self) -> u64 {
        self.records
            .iter()
            .map(|record| record.id)
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }

    pub fn push(&mut self, count: V, timestamp: DateTime<Utc>) -> MetricRecord<V>
    where
        V: Clone,
    {
        let record = MetricRecord {
            id: self.next_id(),
            timestamp,
            count,
        };
        self.records.push(record.clone());
        record
    }

    /// The `limit` most recent records, newest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &MetricRecord<V>> {
        self.records.iter().rev().take(limit)
    }

    pub fn into_records(self) -> Vec<MetricRecord<V>> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(second: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(second, 0).single().unwrap_or_default()
    }

    #[test]
    fn ids_start_at_one_and_follow_the_max() {
        let mut series = MetricSeries::default();
        assert_eq!(series.next_id(), 1);

        series.push(10_u64, at(0));
        series.push(12_u64, at(60));
        assert_eq!(series.next_id(), 3);
        assert_eq!(series.current(), Some(&12));
    }

    #[test]
    fn push_returns_the_stored_record() {
        let mut series = MetricSeries::from_records(vec![MetricRecord {
            id: 7,
            timestamp: at(0),
            count: 1_u64,
        }]);

        let record = series.push(5_u64, at(30));
        assert_eq!(record.id, 8);
        assert_eq!(record.count, 5);
        assert_eq!(series.last(), Some(&record));
    }

    #[test]
    fn next_id_uses_largest_id_not_length() {
        let series = MetricSeries::from_records(vec![
            MetricRecord { id: 4, timestamp: at(0), count: 1_u64 },
            MetricRecord { id: 9, timestamp: at(1), count: 2_u64 },
        ]);

        assert_eq!(series.next_id(), 10);
    }

    #[test]
    fn recent_lists_newest_first() {
        let mut series = MetricSeries::default();
        for value in 1..=5_u64 {
            series.push(value, at(value as i64));
        }

        let recent: Vec<u64> = series.recent(2).map(|record| record.count).collect();
        assert_eq!(recent, vec![5, 4]);
    }
}
