use crate::config::Settings;
use crate::domain::readiness::ReadinessDecision;
use crate::store::WellnessStore;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// Provider field names the decision is written under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFields {
    pub score_field: String,
    pub label_field: String,
}

impl WriteFields {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            score_field: settings.score_field.clone(),
            label_field: settings.label_field.clone(),
        }
    }

    pub fn payload(&self, decision: &ReadinessDecision) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert(self.score_field.clone(), Value::from(decision.score));
        fields.insert(
            self.label_field.clone(),
            Value::String(decision.label.as_str().to_string()),
        );
        fields
    }
}

/// Writes the decision onto `date`'s record. Returns whether a write happened.
/// A failed write is not retried.
pub async fn publish(
    store: &dyn WellnessStore,
    date: NaiveDate,
    decision: Option<&ReadinessDecision>,
    fields: &WriteFields,
) -> Result<bool> {
    let Some(decision) = decision else {
        tracing::info!(%date, "no readiness decision; nothing to publish");
        return Ok(false);
    };

    let payload = fields.payload(decision);
    store
        .upsert(date, &payload)
        .await
        .with_context(|| format!("failed to publish readiness for {date} to {}", store.store_name()))?;

    tracing::info!(
        %date,
        score = decision.score,
        label = %decision.label,
        store = store.store_name(),
        "published readiness"
    );
    Ok(true)
}
