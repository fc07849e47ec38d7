use crate::config::{Credentials, Settings};
use crate::store::error::{AttemptFailure, ForbiddenDiagnosis, StoreError};
use crate::store::transport::{BasicAuth, HttpReply, HttpTransport, ReqwestTransport};
use crate::store::WellnessStore;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use std::time::Duration;

const STANDARD_USERNAME: &str = "API_KEY";

/// Basic-auth encodings accepted by the store for the same secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// Literal `API_KEY` username, secret as password.
    Standard,
    /// `u<athleteId>` username, secret as password.
    Legacy,
}

impl AuthScheme {
    /// Attempt order for reads. Fixed; never shuffled.
    pub const READ_ORDER: [AuthScheme; 2] = [AuthScheme::Standard, AuthScheme::Legacy];

    pub fn name(self) -> &'static str {
        match self {
            AuthScheme::Standard => "standard",
            AuthScheme::Legacy => "legacy",
        }
    }

    pub fn basic_auth(self, credentials: &Credentials) -> BasicAuth {
        let username = match self {
            AuthScheme::Standard => STANDARD_USERNAME.to_string(),
            AuthScheme::Legacy => format!("u{}", credentials.athlete_id),
        };
        BasicAuth {
            username,
            password: credentials.api_key.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntervalsClient<T = ReqwestTransport> {
    transport: T,
    credentials: Credentials,
    base_url: String,
}

impl IntervalsClient<ReqwestTransport> {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let credentials = settings.require_credentials()?;
        let transport = ReqwestTransport::new(Duration::from_secs(settings.timeout_secs))?;
        Ok(Self::with_transport(transport, credentials, &settings.base_url))
    }
}

impl<T: HttpTransport> IntervalsClient<T> {
    pub fn with_transport(transport: T, credentials: Credentials, base_url: &str) -> Self {
        Self {
            transport,
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn athlete_url(&self) -> String {
        format!("{}/athlete/{}", self.base_url, self.credentials.athlete_id)
    }

    fn wellness_range_url(&self, oldest: NaiveDate, newest: NaiveDate) -> String {
        format!(
            "{}/wellness?oldest={}&newest={}",
            self.athlete_url(),
            oldest.format("%Y-%m-%d"),
            newest.format("%Y-%m-%d")
        )
    }

    fn wellness_day_url(&self, date: NaiveDate) -> String {
        format!("{}/wellness/{}", self.athlete_url(), date.format("%Y-%m-%d"))
    }

    fn probe_url(&self) -> String {
        format!("{}/activities?limit=1", self.athlete_url())
    }

    /// GET with the read auth order. Each scheme is tried once. A forbidden
    /// reply on the final scheme triggers the diagnostic probe and fails.
    async fn get_with_fallback(&self, url: &str) -> Result<Value> {
        tracing::info!(%url, "requesting wellness store");

        let schemes = AuthScheme::READ_ORDER;
        let mut last: Option<AttemptFailure> = None;

        for (idx, scheme) in schemes.iter().copied().enumerate() {
            let attempt = idx + 1;
            let is_last = attempt == schemes.len();
            let auth = scheme.basic_auth(&self.credentials);

            match self.transport.get(url, &auth).await {
                Ok(reply) if reply.status.is_success() => {
                    tracing::info!(attempt, scheme = scheme.name(), "auth attempt succeeded");
                    return parse_body(&reply);
                }
                Ok(reply) if reply.status == StatusCode::FORBIDDEN => {
                    tracing::warn!(attempt, scheme = scheme.name(), "auth attempt forbidden");
                    if is_last {
                        let diagnosis = self.diagnose_forbidden(&auth).await;
                        return Err(StoreError::Forbidden { diagnosis }.into());
                    }
                    last = Some(AttemptFailure::Status {
                        status: reply.status,
                        body: reply.body,
                    });
                }
                Ok(reply) => {
                    tracing::warn!(
                        attempt,
                        scheme = scheme.name(),
                        http_status = %reply.status,
                        "auth attempt failed"
                    );
                    last = Some(AttemptFailure::Status {
                        status: reply.status,
                        body: reply.body,
                    });
                }
                Err(err) => {
                    tracing::warn!(attempt, scheme = scheme.name(), error = %err, "auth attempt errored");
                    last = Some(AttemptFailure::Transport {
                        detail: format!("{err:#}"),
                    });
                }
            }
        }

        let Some(last) = last else {
            anyhow::bail!("no auth schemes attempted for {url}");
        };
        Err(StoreError::Exhausted { last }.into())
    }

    async fn diagnose_forbidden(&self, auth: &BasicAuth) -> ForbiddenDiagnosis {
        let url = self.probe_url();
        let diagnosis = match self.transport.get(&url, auth).await {
            Ok(reply) if reply.status.is_success() => ForbiddenDiagnosis::InsufficientScope,
            Ok(reply) => {
                tracing::debug!(http_status = %reply.status, "diagnostic probe rejected");
                ForbiddenDiagnosis::InvalidCredential
            }
            Err(err) => {
                tracing::debug!(error = %err, "diagnostic probe errored");
                ForbiddenDiagnosis::Unknown
            }
        };
        tracing::error!(?diagnosis, advice = diagnosis.advice(), "wellness access forbidden");
        diagnosis
    }
}

#[async_trait::async_trait]
impl<T: HttpTransport> WellnessStore for IntervalsClient<T> {
    fn store_name(&self) -> &'static str {
        "intervals_icu"
    }

    async fn fetch_range(&self, oldest: NaiveDate, newest: NaiveDate) -> Result<Value> {
        let url = self.wellness_range_url(oldest, newest);
        self.get_with_fallback(&url).await
    }

    async fn upsert(&self, date: NaiveDate, fields: &Map<String, Value>) -> Result<()> {
        let url = self.wellness_day_url(date);
        let auth = AuthScheme::Standard.basic_auth(&self.credentials);
        let body = Value::Object(fields.clone());

        tracing::info!(%url, "writing wellness fields");
        let reply = self
            .transport
            .put_json(&url, &auth, &body)
            .await
            .with_context(|| format!("wellness write to {url} failed"))?;

        if !reply.status.is_success() {
            return Err(StoreError::WriteRejected {
                status: reply.status,
                body: reply.body,
            }
            .into());
        }
        Ok(())
    }
}

fn parse_body(reply: &HttpReply) -> Result<Value> {
    if reply.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str::<Value>(&reply.body)
        .with_context(|| format!("wellness response is not valid JSON: {}", reply.body))
}
