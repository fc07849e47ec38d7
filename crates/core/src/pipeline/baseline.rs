//! Causal HRV baseline
//!
//! Every record gets the mean and spread of `ln(hrv)` over the records before
//! it. The record itself and anything after it never enter its own reference.

use crate::domain::wellness::{AnnotatedRecord, BaselineStats, WellnessSeries};

/// Trailing window length, in records.
pub const DEFAULT_WINDOW: usize = 60;
/// Defined values required inside the window before a statistic is produced.
pub const DEFAULT_MIN_PERIODS: usize = 20;
/// Longest run of missing HRV readings that interpolation will bridge.
pub const DEFAULT_MAX_GAP: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselineEstimator {
    pub window: usize,
    pub min_periods: usize,
    pub max_gap: usize,
}

impl Default for BaselineEstimator {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            min_periods: DEFAULT_MIN_PERIODS,
            max_gap: DEFAULT_MAX_GAP,
        }
    }
}

impl BaselineEstimator {
    pub fn annotate(&self, series: &WellnessSeries) -> Vec<AnnotatedRecord> {
        let raw_hrv: Vec<Option<f64>> = series.records().iter().map(|r| r.hrv).collect();
        let hrv = interpolate_gaps(&raw_hrv, self.max_gap);
        let logs: Vec<Option<f64>> = hrv.iter().map(|v| log_hrv(*v)).collect();

        series
            .records()
            .iter()
            .enumerate()
            .map(|(i, record)| {
                // Gap filling for the reference sees only records before `i`,
                // so a gap ending at `i` stays open here.
                let prior = interpolate_gaps(&raw_hrv[..i], self.max_gap);
                let start = i.saturating_sub(self.window);
                let prior_logs: Vec<Option<f64>> =
                    prior[start..].iter().map(|v| log_hrv(*v)).collect();
                let (hrv_baseline, hrv_std) = self.window_stats(&prior_logs);

                let mut record = record.clone();
                record.hrv = hrv[i];

                AnnotatedRecord {
                    record,
                    stats: BaselineStats {
                        hrv_log: logs[i],
                        hrv_baseline,
                        hrv_std,
                    },
                }
            })
            .collect()
    }

    /// Mean and sample standard deviation of the defined values in `prior`.
    fn window_stats(&self, prior: &[Option<f64>]) -> (Option<f64>, Option<f64>) {
        let values: Vec<f64> = prior.iter().flatten().copied().collect();
        let n = values.len();
        if n == 0 || n < self.min_periods {
            return (None, None);
        }

        // Constant windows have exactly zero spread; summing would leave rounding noise.
        let first = values[0];
        if values.iter().all(|v| *v == first) {
            return (Some(first), if n > 1 { Some(0.0) } else { None });
        }

        let mean = values.iter().sum::<f64>() / n as f64;
        if n < 2 {
            return (Some(mean), None);
        }
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        (Some(mean), Some(var.sqrt()))
    }
}

pub fn annotate(series: &WellnessSeries) -> Vec<AnnotatedRecord> {
    BaselineEstimator::default().annotate(series)
}

/// Linear fill of interior runs of at most `max_gap` missing values. Longer
/// runs, and runs without a known value on both sides, are left untouched.
pub fn interpolate_gaps(values: &[Option<f64>], max_gap: usize) -> Vec<Option<f64>> {
    let mut out = values.to_vec();
    let mut prev: Option<(usize, f64)> = None;

    for (j, value) in values.iter().enumerate() {
        let Some(right) = *value else {
            continue;
        };
        if let Some((i, left)) = prev {
            let gap = j - i - 1;
            if (1..=max_gap).contains(&gap) {
                let span = (j - i) as f64;
                for (k, slot) in out.iter_mut().enumerate().take(j).skip(i + 1) {
                    let t = (k - i) as f64 / span;
                    *slot = Some(left + (right - left) * t);
                }
            }
        }
        prev = Some((j, right));
    }

    out
}

fn log_hrv(hrv: Option<f64>) -> Option<f64> {
    hrv.filter(|v| v.is_finite() && *v > 0.0).map(f64::ln)
}
