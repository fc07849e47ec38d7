use crate::config::StalePolicy;
use crate::domain::readiness::{ReadinessDecision, ReadinessLabel};
use crate::domain::wellness::{AnnotatedRecord, BaselineStats};
use anyhow::Result;
use chrono::NaiveDate;

/// Values the gates look at. Undefined metrics are already replaced by 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateInputs {
    pub sleep_score: f64,
    pub stress: f64,
    pub tsb: f64,
    pub z: f64,
}

impl GateInputs {
    pub fn from_annotated(today: &AnnotatedRecord) -> Self {
        Self {
            sleep_score: today.record.sleep_score.unwrap_or(0.0),
            stress: today.record.stress.unwrap_or(0.0),
            tsb: today.record.tsb.unwrap_or(0.0),
            z: hrv_z_score(&today.stats),
        }
    }
}

/// Deviation of today's `ln(hrv)` from its trailing baseline, in standard
/// deviations. 0 whenever any input is undefined or the spread is 0.
pub fn hrv_z_score(stats: &BaselineStats) -> f64 {
    match (stats.hrv_log, stats.hrv_baseline, stats.hrv_std) {
        (Some(log), Some(baseline), Some(std)) if std != 0.0 && std.is_finite() => {
            (log - baseline) / std
        }
        _ => 0.0,
    }
}

pub struct Gate {
    pub name: &'static str,
    pub matches: fn(&GateInputs) -> bool,
    pub decision: ReadinessDecision,
}

const fn decide(score: u8, label: ReadinessLabel) -> ReadinessDecision {
    ReadinessDecision { score, label }
}

/// Evaluated top to bottom; the first match wins.
pub static GATES: [Gate; 7] = [
    Gate {
        name: "sleep_fail",
        matches: |g| g.sleep_score > 0.0 && g.sleep_score < 40.0,
        decision: decide(2, ReadinessLabel::RestLifestyle),
    },
    Gate {
        name: "stress_fail",
        matches: |g| g.stress > 85.0,
        decision: decide(2, ReadinessLabel::RestLifestyle),
    },
    Gate {
        name: "tsb_too_low",
        matches: |g| g.tsb < -35.0,
        decision: decide(3, ReadinessLabel::HighRiskLoad),
    },
    Gate {
        name: "sympathetic_stress",
        matches: |g| g.z < -1.5,
        decision: decide(1, ReadinessLabel::RestSympathetic),
    },
    Gate {
        name: "parasympathetic_saturation",
        matches: |g| g.z > 1.5,
        decision: decide(6, ReadinessLabel::CautionParasympathetic),
    },
    Gate {
        name: "slight_fatigue",
        matches: |g| (-1.5..=-0.5).contains(&g.z),
        decision: decide(7, ReadinessLabel::TrainEasy),
    },
    Gate {
        name: "all_systems_go",
        matches: |_| true,
        decision: decide(10, ReadinessLabel::GoHard),
    },
];

/// Returns the first matching gate. The last gate always matches.
pub fn evaluate_gates(inputs: &GateInputs) -> &'static Gate {
    GATES
        .iter()
        .find(|gate| (gate.matches)(inputs))
        .unwrap_or(&GATES[GATES.len() - 1])
}

pub fn classify_record(today: &AnnotatedRecord) -> ReadinessDecision {
    let inputs = GateInputs::from_annotated(today);
    let gate = evaluate_gates(&inputs);
    tracing::info!(
        gate = gate.name,
        sleep_score = inputs.sleep_score,
        stress = inputs.stress,
        tsb = inputs.tsb,
        z = inputs.z,
        score = gate.decision.score,
        label = %gate.decision.label,
        "readiness gate matched"
    );
    gate.decision
}

/// Classifies the newest record. `None` when there are no records.
///
/// A newest record older than `run_date` is handled per `stale_policy`.
pub fn classify(
    annotated: &[AnnotatedRecord],
    run_date: NaiveDate,
    stale_policy: StalePolicy,
) -> Result<Option<ReadinessDecision>> {
    let Some(today) = annotated.last() else {
        return Ok(None);
    };

    let last_sync = today.record.date;
    if last_sync != run_date {
        match stale_policy {
            StalePolicy::Warn => tracing::warn!(
                %run_date,
                %last_sync,
                "no wellness record for the run date; using latest available record"
            ),
            StalePolicy::Fail => anyhow::bail!(
                "no wellness record for {run_date}; last sync was {last_sync}"
            ),
        }
    }

    Ok(Some(classify_record(today)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::wellness::WellnessRecord;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn inputs(sleep_score: f64, stress: f64, tsb: f64, z: f64) -> GateInputs {
        GateInputs {
            sleep_score,
            stress,
            tsb,
            z,
        }
    }

    fn outcome(i: GateInputs) -> (u8, ReadinessLabel) {
        let d = evaluate_gates(&i).decision;
        (d.score, d.label)
    }

    fn annotated(date: NaiveDate, stats: BaselineStats) -> AnnotatedRecord {
        let mut record = WellnessRecord::empty(date);
        record.sleep_score = Some(70.0);
        record.stress = Some(10.0);
        record.tsb = Some(0.0);
        AnnotatedRecord { record, stats }
    }

    #[test]
    fn z_is_zero_without_usable_spread() {
        let undefined = BaselineStats {
            hrv_log: Some(4.0),
            hrv_baseline: Some(3.9),
            hrv_std: None,
        };
        assert_eq!(hrv_z_score(&undefined), 0.0);

        let flat = BaselineStats {
            hrv_std: Some(0.0),
            ..undefined
        };
        assert_eq!(hrv_z_score(&flat), 0.0);

        let missing_today = BaselineStats {
            hrv_log: None,
            hrv_std: Some(0.1),
            ..undefined
        };
        assert_eq!(hrv_z_score(&missing_today), 0.0);
    }

    #[test]
    fn z_measures_deviation_in_standard_deviations() {
        let stats = BaselineStats {
            hrv_log: Some(3.7),
            hrv_baseline: Some(3.9),
            hrv_std: Some(0.1),
        };
        assert!((hrv_z_score(&stats) + 2.0).abs() < 1e-9);
    }

    #[test]
    fn each_gate_is_reachable() {
        use ReadinessLabel::*;
        assert_eq!(outcome(inputs(25.0, 10.0, 0.0, 0.0)), (2, RestLifestyle));
        assert_eq!(outcome(inputs(70.0, 90.0, 0.0, 0.0)), (2, RestLifestyle));
        assert_eq!(outcome(inputs(70.0, 10.0, -40.0, 0.0)), (3, HighRiskLoad));
        assert_eq!(outcome(inputs(70.0, 10.0, 0.0, -2.0)), (1, RestSympathetic));
        assert_eq!(outcome(inputs(70.0, 10.0, 0.0, 2.0)), (6, CautionParasympathetic));
        assert_eq!(outcome(inputs(70.0, 10.0, 0.0, -1.0)), (7, TrainEasy));
        assert_eq!(outcome(inputs(70.0, 10.0, 0.0, 0.0)), (10, GoHard));
    }

    #[test]
    fn gate_boundaries() {
        use ReadinessLabel::*;
        // Missing sleep (0) never fails the sleep gate.
        assert_eq!(outcome(inputs(0.0, 0.0, 0.0, 0.0)), (10, GoHard));
        assert_eq!(outcome(inputs(40.0, 0.0, 0.0, 0.0)), (10, GoHard));
        assert_eq!(outcome(inputs(70.0, 85.0, 0.0, 0.0)), (10, GoHard));
        assert_eq!(outcome(inputs(70.0, 0.0, -35.0, 0.0)), (10, GoHard));
        assert_eq!(outcome(inputs(70.0, 0.0, 0.0, -1.5)), (7, TrainEasy));
        assert_eq!(outcome(inputs(70.0, 0.0, 0.0, -0.5)), (7, TrainEasy));
        assert_eq!(outcome(inputs(70.0, 0.0, 0.0, -0.49)), (10, GoHard));
        assert_eq!(outcome(inputs(70.0, 0.0, 0.0, 1.5)), (10, GoHard));
    }

    #[test]
    fn earlier_gates_dominate() {
        use ReadinessLabel::*;
        assert_eq!(outcome(inputs(25.0, 0.0, 0.0, -3.0)), (2, RestLifestyle));
        assert_eq!(outcome(inputs(25.0, 95.0, -50.0, -3.0)), (2, RestLifestyle));
        assert_eq!(outcome(inputs(70.0, 10.0, -50.0, 3.0)), (3, HighRiskLoad));
    }

    #[test]
    fn scores_come_from_the_closed_set() {
        for gate in &GATES {
            assert!([1, 2, 3, 6, 7, 10].contains(&gate.decision.score), "{}", gate.name);
        }
    }

    #[test]
    fn empty_input_yields_no_decision() {
        let out = classify(&[], day(2026, 1, 27), StalePolicy::Fail).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn stale_record_is_classified_under_warn_policy() {
        let records = [annotated(day(2026, 1, 25), BaselineStats::default())];
        let out = classify(&records, day(2026, 1, 27), StalePolicy::Warn).unwrap();
        assert_eq!(
            out,
            Some(ReadinessDecision {
                score: 10,
                label: ReadinessLabel::GoHard
            })
        );
    }

    #[test]
    fn stale_record_fails_under_fail_policy() {
        let records = [annotated(day(2026, 1, 25), BaselineStats::default())];
        let err = classify(&records, day(2026, 1, 27), StalePolicy::Fail).unwrap_err();
        assert!(err.to_string().contains("2026-01-25"));
    }

    #[test]
    fn missing_gate_fields_count_as_zero() {
        let record = WellnessRecord::empty(day(2026, 1, 27));
        let today = AnnotatedRecord {
            record,
            stats: BaselineStats::default(),
        };
        assert_eq!(GateInputs::from_annotated(&today), inputs(0.0, 0.0, 0.0, 0.0));
    }
}
