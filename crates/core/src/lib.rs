pub mod domain;
pub mod pipeline;
pub mod store;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_BASE_URL: &str = "https://intervals.icu/api/v1";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_LOOKBACK_DAYS: i64 = 60;
    pub const MAX_LOOKBACK_DAYS: i64 = 3650;
    pub const DEFAULT_SCORE_FIELD: &str = "HybridScore";
    pub const DEFAULT_LABEL_FIELD: &str = "ReadinessLabel";

    /// What to do when the newest record is older than the run date.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum StalePolicy {
        /// Classify the latest available record and log a warning.
        #[default]
        Warn,
        /// Abort the run before anything is written.
        Fail,
    }

    impl StalePolicy {
        pub fn parse(s: &str) -> anyhow::Result<Self> {
            match s.trim().to_ascii_lowercase().as_str() {
                "warn" => Ok(Self::Warn),
                "fail" => Ok(Self::Fail),
                other => anyhow::bail!("READINESS_STALE_POLICY must be warn or fail (got {other:?})"),
            }
        }
    }

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub api_key: Option<String>,
        pub athlete_id: Option<String>,
        pub base_url: String,
        pub timeout_secs: u64,
        pub lookback_days: i64,
        pub score_field: String,
        pub label_field: String,
        pub stale_policy: StalePolicy,
        pub sentry_dsn: Option<String>,
    }

    /// Credentials checked for presence; handed to the store client.
    #[derive(Debug, Clone)]
    pub struct Credentials {
        pub api_key: String,
        pub athlete_id: String,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                api_key: None,
                athlete_id: None,
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
                lookback_days: DEFAULT_LOOKBACK_DAYS,
                score_field: DEFAULT_SCORE_FIELD.to_string(),
                label_field: DEFAULT_LABEL_FIELD.to_string(),
                stale_policy: StalePolicy::Warn,
                sentry_dsn: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();

            let timeout_secs = std::env::var("INTERVALS_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(defaults.timeout_secs);

            let lookback_days = std::env::var("READINESS_LOOKBACK_DAYS")
                .ok()
                .and_then(|s| parse_lookback_days(&s))
                .unwrap_or(defaults.lookback_days);

            let stale_policy = match non_empty_var("READINESS_STALE_POLICY") {
                Some(s) => StalePolicy::parse(&s)?,
                None => defaults.stale_policy,
            };

            Ok(Self {
                api_key: non_empty_var("INTERVALS_API_KEY"),
                athlete_id: non_empty_var("INTERVALS_ATHLETE_ID"),
                base_url: non_empty_var("INTERVALS_BASE_URL").unwrap_or(defaults.base_url),
                timeout_secs,
                lookback_days,
                score_field: non_empty_var("READINESS_SCORE_FIELD").unwrap_or(defaults.score_field),
                label_field: non_empty_var("READINESS_LABEL_FIELD").unwrap_or(defaults.label_field),
                stale_policy,
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn require_api_key(&self) -> anyhow::Result<&str> {
            self.api_key
                .as_deref()
                .context("INTERVALS_API_KEY is required")
        }

        pub fn require_athlete_id(&self) -> anyhow::Result<&str> {
            self.athlete_id
                .as_deref()
                .context("INTERVALS_ATHLETE_ID is required")
        }

        pub fn require_credentials(&self) -> anyhow::Result<Credentials> {
            Ok(Credentials {
                api_key: self.require_api_key()?.to_string(),
                athlete_id: self.require_athlete_id()?.to_string(),
            })
        }
    }

    fn parse_lookback_days(s: &str) -> Option<i64> {
        s.trim()
            .parse::<i64>()
            .ok()
            .filter(|d| (1..=MAX_LOOKBACK_DAYS).contains(d))
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

}
