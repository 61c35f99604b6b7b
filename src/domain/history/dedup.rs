//! Near-duplicate summary removal.
//!
//! Retries and the forced-diagnosis fallback can store several summaries for
//! one consultation. Summaries closer together than the window are treated as
//! the same episode and collapsed to one.

use chrono::Duration;
use std::collections::BTreeMap;

use super::{HistoryRecord, DOCTOR_SUMMARY_TITLE};
use crate::domain::foundation::{HistoryRecordId, Timestamp};

/// Collapses near-duplicate summary records.
///
/// # Invariants
///
/// - conversation records are always kept
/// - retained summaries are pairwise at least `window` apart, which makes
///   the operation idempotent
#[derive(Debug, Clone)]
pub struct HistoryDeduplicator {
    window: Duration,
    preferred_title: String,
}

impl Default for HistoryDeduplicator {
    fn default() -> Self {
        Self::new(Duration::minutes(5), DOCTOR_SUMMARY_TITLE)
    }
}

impl HistoryDeduplicator {
    pub fn new(window: Duration, preferred_title: impl Into<String>) -> Self {
        Self {
            window,
            preferred_title: preferred_title.into(),
        }
    }

    // Preferred title first, then later timestamp, then larger id.
    fn rank(&self, record: &HistoryRecord) -> (bool, Timestamp, HistoryRecordId) {
        (record.title == self.preferred_title, record.timestamp, record.id)
    }

    /// Returns the deduplicated records, newest first.
    pub fn dedup(&self, records: impl IntoIterator<Item = HistoryRecord>) -> Vec<HistoryRecord> {
        let mut ordered: Vec<HistoryRecord> = records.into_iter().collect();
        ordered.sort_by_key(|r| (r.timestamp, r.id));

        let mut retained: BTreeMap<HistoryRecordId, HistoryRecord> = BTreeMap::new();
        for record in ordered {
            if !record.is_summary() {
                retained.insert(record.id, record);
                continue;
            }

            let conflicts: Vec<HistoryRecordId> = retained
                .values()
                .filter(|kept| kept.is_summary())
                .filter(|kept| kept.timestamp.is_within(&record.timestamp, self.window))
                .map(|kept| kept.id)
                .collect();

            let outranks_all = conflicts
                .iter()
                .filter_map(|id| retained.get(id))
                .all(|kept| self.rank(&record) > self.rank(kept));

            if outranks_all {
                for id in &conflicts {
                    retained.remove(id);
                }
                retained.insert(record.id, record);
            }
        }

        let mut out: Vec<HistoryRecord> = retained.into_values().collect();
        out.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::history::{HistoryRecord, MEDICAL_RECOMMENDATION_TITLE};
    use proptest::prelude::*;

    const BASE: i64 = 1_705_314_600_000;
    const MINUTE: i64 = 60_000;

    fn summary(ms: i64, title: &str) -> HistoryRecord {
        HistoryRecord::summary(
            HistoryRecordId::from_millis(ms),
            Timestamp::from_millis(ms).unwrap(),
            title,
            "content",
        )
    }

    fn conversation(ms: i64) -> HistoryRecord {
        HistoryRecord::conversation(
            HistoryRecordId::from_millis(ms),
            Timestamp::from_millis(ms).unwrap(),
            "hi",
            "hello",
        )
    }

    fn titles(records: &[HistoryRecord]) -> Vec<&str> {
        records.iter().map(|r| r.title.as_str()).collect()
    }

    mod episodes {
        use super::*;

        #[test]
        fn doctor_summary_beats_recommendation_two_minutes_apart() {
            let records = vec![
                summary(BASE + 2 * MINUTE, MEDICAL_RECOMMENDATION_TITLE),
                summary(BASE, DOCTOR_SUMMARY_TITLE),
            ];
            let out = HistoryDeduplicator::default().dedup(records);
            assert_eq!(titles(&out), vec![DOCTOR_SUMMARY_TITLE]);
        }

        #[test]
        fn later_doctor_summary_replaces_earlier_recommendation() {
            let records = vec![
                summary(BASE, MEDICAL_RECOMMENDATION_TITLE),
                summary(BASE + MINUTE, DOCTOR_SUMMARY_TITLE),
            ];
            let out = HistoryDeduplicator::default().dedup(records);
            assert_eq!(out.len(), 1);
            assert_eq!(out[0].timestamp.as_millis(), BASE + MINUTE);
        }

        #[test]
        fn same_title_prefers_later() {
            let records = vec![
                summary(BASE, MEDICAL_RECOMMENDATION_TITLE),
                summary(BASE + MINUTE, MEDICAL_RECOMMENDATION_TITLE),
            ];
            let out = HistoryDeduplicator::default().dedup(records);
            assert_eq!(out.len(), 1);
            assert_eq!(out[0].timestamp.as_millis(), BASE + MINUTE);
        }

        #[test]
        fn summaries_five_minutes_apart_are_distinct() {
            let records = vec![
                summary(BASE, DOCTOR_SUMMARY_TITLE),
                summary(BASE + 5 * MINUTE, DOCTOR_SUMMARY_TITLE),
            ];
            assert_eq!(HistoryDeduplicator::default().dedup(records).len(), 2);
        }
    }

    mod conversations {
        use super::*;

        #[test]
        fn always_kept_and_never_conflict() {
            let records = vec![
                conversation(BASE),
                summary(BASE + 1_000, DOCTOR_SUMMARY_TITLE),
                conversation(BASE + 2_000),
                summary(BASE + 3_000, MEDICAL_RECOMMENDATION_TITLE),
            ];
            let out = HistoryDeduplicator::default().dedup(records);
            assert_eq!(out.len(), 3);
            assert_eq!(out.iter().filter(|r| !r.is_summary()).count(), 2);
        }

        #[test]
        fn output_is_newest_first() {
            let records = vec![conversation(BASE), conversation(BASE + 10), conversation(BASE + 5)];
            let out = HistoryDeduplicator::default().dedup(records);
            let ms: Vec<i64> = out.iter().map(|r| r.timestamp.as_millis()).collect();
            assert_eq!(ms, vec![BASE + 10, BASE + 5, BASE]);
        }
    }

    #[test]
    fn empty_input() {
        assert!(HistoryDeduplicator::default().dedup(Vec::new()).is_empty());
    }

    fn record() -> impl Strategy<Value = HistoryRecord> {
        (
            0i64..30,
            prop_oneof![
                Just(DOCTOR_SUMMARY_TITLE),
                Just(MEDICAL_RECOMMENDATION_TITLE),
                Just("Other")
            ],
            any::<bool>(),
        )
            .prop_map(|(minutes, title, is_summary)| {
                let ms = BASE + minutes * MINUTE;
                if is_summary {
                    summary(ms, title)
                } else {
                    conversation(ms)
                }
            })
    }

    proptest! {
        #[test]
        fn dedup_is_idempotent(records in proptest::collection::vec(record(), 0..25)) {
            let dedup = HistoryDeduplicator::default();
            let once = dedup.dedup(records);
            let twice = dedup.dedup(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn retained_summaries_are_window_apart(records in proptest::collection::vec(record(), 0..25)) {
            let dedup = HistoryDeduplicator::default();
            let out = dedup.dedup(records);
            let summaries: Vec<_> = out.iter().filter(|r| r.is_summary()).collect();
            for (i, a) in summaries.iter().enumerate() {
                for b in &summaries[i + 1..] {
                    prop_assert!(!a.timestamp.is_within(&b.timestamp, Duration::minutes(5)));
                }
            }
        }
    }
}
