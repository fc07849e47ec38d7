pub mod baseline;
pub mod classify;
pub mod normalize;
pub mod publish;

use crate::config::{Settings, StalePolicy};
use crate::domain::readiness::ReadinessDecision;
use crate::store::WellnessStore;
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use publish::WriteFields;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub run_date: NaiveDate,
    pub lookback_days: i64,
    pub stale_policy: StalePolicy,
    pub write_fields: WriteFields,
    /// Compute everything but skip the write.
    pub dry_run: bool,
}

impl RunOptions {
    pub fn from_settings(settings: &Settings, run_date: NaiveDate, dry_run: bool) -> Self {
        Self {
            run_date,
            lookback_days: settings.lookback_days,
            stale_policy: settings.stale_policy,
            write_fields: WriteFields::from_settings(settings),
            dry_run,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub records: usize,
    pub decision: Option<ReadinessDecision>,
    pub published: bool,
}

/// One pass: read the lookback window, score the newest day, write the result
/// for `run_date`. Nothing is written unless every earlier step succeeded.
pub async fn run(store: &dyn WellnessStore, opts: &RunOptions) -> Result<RunOutcome> {
    let newest = opts.run_date;
    let oldest = Duration::try_days(opts.lookback_days)
        .and_then(|d| newest.checked_sub_signed(d))
        .with_context(|| {
            format!("lookback of {} days before {newest} is out of range", opts.lookback_days)
        })?;

    let raw = store
        .fetch_range(oldest, newest)
        .await
        .with_context(|| format!("failed to read wellness for {oldest}..={newest}"))?;
    let series = normalize::normalize(raw)?;
    if series.is_empty() {
        tracing::warn!(%oldest, %newest, "no wellness data found in range");
    }

    let annotated = baseline::annotate(&series);
    let decision = classify::classify(&annotated, opts.run_date, opts.stale_policy)?;

    let published = if opts.dry_run {
        tracing::info!(run_date = %opts.run_date, ?decision, "dry run; skipping publish");
        false
    } else {
        publish::publish(store, opts.run_date, decision.as_ref(), &opts.write_fields).await?
    };

    Ok(RunOutcome {
        records: series.len(),
        decision,
        published,
    })
}
