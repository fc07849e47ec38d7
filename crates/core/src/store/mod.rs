pub mod error;
pub mod intervals;
pub mod transport;

use chrono::NaiveDate;
use serde_json::{Map, Value};

/// Remote wellness-record store. Reads a date range, writes one day's derived fields.
#[async_trait::async_trait]
pub trait WellnessStore: Send + Sync {
    fn store_name(&self) -> &'static str;

    /// Inclusive range read. The body is returned untouched: a list, a single
    /// object, or `null`.
    async fn fetch_range(&self, oldest: NaiveDate, newest: NaiveDate) -> anyhow::Result<Value>;

    /// Overwrites the given fields on the record for `date`.
    async fn upsert(&self, date: NaiveDate, fields: &Map<String, Value>) -> anyhow::Result<()>;
}
