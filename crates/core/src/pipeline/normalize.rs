use crate::domain::wellness::{WellnessRecord, WellnessSeries};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Wire shape of a wellness record. Unknown keys are ignored; absent and
/// `null` both decode to `None`.
#[derive(Debug, Clone, Deserialize)]
struct RawWellnessRecord {
    id: String,
    #[serde(default)]
    ctl: Option<f64>,
    #[serde(default)]
    atl: Option<f64>,
    #[serde(default)]
    tsb: Option<f64>,
    #[serde(default)]
    hrv: Option<f64>,
    #[serde(default, rename = "sleepScore")]
    sleep_score: Option<f64>,
    #[serde(default)]
    stress: Option<f64>,
}

impl RawWellnessRecord {
    fn into_record(self) -> Result<WellnessRecord> {
        let date = parse_record_date(&self.id)?;
        let tsb = self
            .tsb
            .unwrap_or_else(|| self.ctl.unwrap_or(0.0) - self.atl.unwrap_or(0.0));

        Ok(WellnessRecord {
            date,
            ctl: self.ctl,
            atl: self.atl,
            tsb: Some(tsb),
            hrv: self.hrv,
            sleep_score: self.sleep_score,
            stress: self.stress,
        })
    }
}

/// Turns a raw read result into a date-ordered series.
///
/// A single object is a one-element series; `null` or an empty list is an
/// empty series. A record whose `id` is not a date is a fatal input error.
pub fn normalize(raw: Value) -> Result<WellnessSeries> {
    let items = match raw {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        other => anyhow::bail!("unexpected wellness payload shape: {other}"),
    };

    // Keyed by date: a repeated date keeps the last record seen.
    let mut by_date = BTreeMap::<NaiveDate, WellnessRecord>::new();
    for (idx, item) in items.into_iter().enumerate() {
        let raw = serde_json::from_value::<RawWellnessRecord>(item)
            .with_context(|| format!("failed to decode wellness record at index {idx}"))?;
        let record = raw.into_record()?;
        by_date.insert(record.date, record);
    }

    Ok(WellnessSeries::from_sorted(by_date.into_values().collect()))
}

fn parse_record_date(id: &str) -> Result<NaiveDate> {
    let day = id.trim().split('T').next().unwrap_or_default();
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .with_context(|| format!("wellness record id is not a date: {id:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::wellness::TRACKED_FIELDS;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_inputs_yield_empty_series_with_declared_fields() {
        for raw in [Value::Null, json!([])] {
            let series = normalize(raw).unwrap();
            assert!(series.is_empty());
            assert_eq!(series.fields(), &TRACKED_FIELDS);
            assert!(series.latest().is_none());
        }
    }

    #[test]
    fn single_object_is_one_element_series() {
        let series = normalize(json!({"id": "2026-01-27", "hrv": 55.0})).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.records()[0].hrv, Some(55.0));
    }

    #[test]
    fn sorts_ascending_and_collapses_duplicate_dates() {
        let series = normalize(json!([
            {"id": "2026-01-27", "hrv": 1.0},
            {"id": "2026-01-25", "hrv": 2.0},
            {"id": "2026-01-26", "hrv": 3.0},
            {"id": "2026-01-25", "hrv": 4.0},
        ]))
        .unwrap();

        let dates: Vec<_> = series.records().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(2026, 1, 25), day(2026, 1, 26), day(2026, 1, 27)]);
        assert_eq!(series.records()[0].hrv, Some(4.0));
    }

    #[test]
    fn absent_fields_stay_undefined_not_zero() {
        let series = normalize(json!([{"id": "2026-01-27", "sleepScore": null}])).unwrap();
        let r = &series.records()[0];
        assert_eq!(r.hrv, None);
        assert_eq!(r.sleep_score, None);
        assert_eq!(r.stress, None);
        assert_eq!(r.ctl, None);
        assert_eq!(r.atl, None);
    }

    #[test]
    fn derives_tsb_from_load_with_zero_stand_ins() {
        let series = normalize(json!([
            {"id": "2026-01-25", "ctl": 60.0, "atl": 75.0},
            {"id": "2026-01-26", "atl": 20.0},
            {"id": "2026-01-27"},
            {"id": "2026-01-28", "ctl": 60.0, "atl": 75.0, "tsb": 3.0},
        ]))
        .unwrap();

        let tsb: Vec<_> = series.records().iter().map(|r| r.tsb).collect();
        assert_eq!(tsb, vec![Some(-15.0), Some(-20.0), Some(0.0), Some(3.0)]);
    }

    #[test]
    fn tolerates_time_suffix_and_ignores_unknown_keys() {
        let series =
            normalize(json!([{"id": "2026-01-27T00:00:00", "restingHR": 48, "stress": 12}])).unwrap();
        assert_eq!(series.records()[0].date, day(2026, 1, 27));
        assert_eq!(series.records()[0].stress, Some(12.0));
    }

    #[test]
    fn malformed_date_is_fatal() {
        assert!(normalize(json!([{"id": "yesterday"}])).is_err());
        assert!(normalize(json!([{"hrv": 50}])).is_err());
    }

    #[test]
    fn non_numeric_metric_is_fatal() {
        assert!(normalize(json!([{"id": "2026-01-27", "hrv": "fifty"}])).is_err());
    }
}
