//! History module - saved exchanges and summaries.

mod dedup;
mod record;

pub use dedup::HistoryDeduplicator;
pub use record::{
    strip_markup, truncate, HistoryRecord, RecordKind, DOCTOR_SUMMARY_TITLE,
    MEDICAL_RECOMMENDATION_TITLE,
};
