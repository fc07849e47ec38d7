use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tracked per-day fields, in the provider's key spelling.
pub const TRACKED_FIELDS: [&str; 6] = ["ctl", "atl", "tsb", "hrv", "sleepScore", "stress"];

/// One calendar day's observation. Every metric is optional; absence means
/// "undefined", never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessRecord {
    pub date: NaiveDate,
    pub ctl: Option<f64>,
    pub atl: Option<f64>,
    pub tsb: Option<f64>,
    pub hrv: Option<f64>,
    pub sleep_score: Option<f64>,
    pub stress: Option<f64>,
}

impl WellnessRecord {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            ctl: None,
            atl: None,
            tsb: None,
            hrv: None,
            sleep_score: None,
            stress: None,
        }
    }
}

/// Records ordered ascending by date with unique dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WellnessSeries {
    records: Vec<WellnessRecord>,
}

impl WellnessSeries {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Field names every record of this series declares, even when it has no rows.
    pub fn fields(&self) -> &'static [&'static str] {
        &TRACKED_FIELDS
    }

    /// Caller guarantees ascending, unique dates (see `pipeline::normalize`).
    pub(crate) fn from_sorted(records: Vec<WellnessRecord>) -> Self {
        debug_assert!(records.windows(2).all(|w| w[0].date < w[1].date));
        Self { records }
    }

    pub fn records(&self) -> &[WellnessRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest(&self) -> Option<&WellnessRecord> {
        self.records.last()
    }
}

/// Causal HRV statistics attached to one record. `hrv_baseline` and `hrv_std`
/// only ever see records strictly before the one they annotate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BaselineStats {
    pub hrv_log: Option<f64>,
    pub hrv_baseline: Option<f64>,
    pub hrv_std: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRecord {
    /// The record after HRV gap filling.
    pub record: WellnessRecord,
    pub stats: BaselineStats,
}
