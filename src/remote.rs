use crate::config::{RemoteSchema, TrackerConfig};
use crate::errors::RemoteError;
use crate::models::{day_key, Dataset, DayRecord};
use reqwest::{header::CONTENT_TYPE, Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Record-of-truth service: load everything, save one day at a time.
pub trait RemoteStore: Send + Sync + 'static {
    fn fetch_all(&self) -> impl Future<Output = Result<Dataset, RemoteError>> + Send;

    fn save_day(
        &self,
        index: usize,
        record: &DayRecord,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

/// `{ok, data?, error?}` as returned by the record store for reads and writes.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T> Envelope<T> {
    fn into_result(self, fallback: &str) -> Result<Option<T>, String> {
        if self.ok {
            Ok(self.data)
        } else {
            Err(self.error.unwrap_or_else(|| fallback.to_string()))
        }
    }
}

#[derive(Debug, Serialize)]
struct WriteRequest<'a> {
    day: String,
    tasks: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    url: String,
    schema: RemoteSchema,
}

impl HttpRemote {
    pub fn new(
        url: impl Into<String>,
        schema: RemoteSchema,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Unavailable(format!("HTTP client build failed: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            schema,
        })
    }

    /// Client for the configured URL, or `None` when running without a remote.
    pub fn from_config(config: &TrackerConfig) -> Option<Result<Self, RemoteError>> {
        let url = config.remote_url.as_ref()?;
        Some(Self::new(url.clone(), config.remote_schema, config.remote_timeout))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<Envelope<T>, String> {
    let status = response.status();
    if !status.is_success() {
        return Err(format!("HTTP error {status} from {}", response.url()));
    }
    response.json().await.map_err(|e| format!("malformed response: {e}"))
}

impl RemoteStore for HttpRemote {
    async fn fetch_all(&self) -> Result<Dataset, RemoteError> {
        debug!(url = %self.url, "fetching all days");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;
        let envelope: Envelope<Dataset> = read_envelope(response)
            .await
            .map_err(RemoteError::Unavailable)?;
        let data = envelope
            .into_result("Unknown error")
            .map_err(RemoteError::Unavailable)?;
        Ok(data.unwrap_or_default())
    }

    async fn save_day(&self, index: usize, record: &DayRecord) -> Result<(), RemoteError> {
        let body = WriteRequest {
            day: day_key(index),
            tasks: record.tasks(),
            note: match self.schema {
                RemoteSchema::Canonical => Some(record.note()),
                RemoteSchema::Legacy => None,
            },
        };
        let payload =
            serde_json::to_string(&body).map_err(|e| RemoteError::WriteFailed(e.to_string()))?;
        debug!(url = %self.url, day = %body.day, "saving day");

        // text/plain keeps script endpoints from demanding a CORS preflight.
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "text/plain")
            .body(payload)
            .send()
            .await
            .map_err(|e| RemoteError::WriteFailed(e.to_string()))?;
        let envelope: Envelope<serde_json::Value> = read_envelope(response)
            .await
            .map_err(RemoteError::WriteFailed)?;
        envelope
            .into_result("Save failed")
            .map(|_| ())
            .map_err(RemoteError::WriteFailed)
    }
}

/// Stand-in used when no remote URL is configured. Every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineRemote;

impl RemoteStore for OfflineRemote {
    async fn fetch_all(&self) -> Result<Dataset, RemoteError> {
        Err(RemoteError::Unavailable("no remote store configured".into()))
    }

    async fn save_day(&self, _index: usize, _record: &DayRecord) -> Result<(), RemoteError> {
        Err(RemoteError::WriteFailed("no remote store configured".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_failure_uses_error_field() {
        let envelope: Envelope<Dataset> =
            serde_json::from_value(json!({ "ok": false, "error": "quota" })).unwrap();
        assert_eq!(envelope.into_result("Unknown error").unwrap_err(), "quota");

        let envelope: Envelope<Dataset> = serde_json::from_value(json!({})).unwrap();
        assert_eq!(
            envelope.into_result("Unknown error").unwrap_err(),
            "Unknown error"
        );
    }

    #[test]
    fn envelope_success_without_data_is_empty() {
        let envelope: Envelope<Dataset> =
            serde_json::from_value(json!({ "ok": true, "data": null })).unwrap();
        assert_eq!(envelope.into_result("x").unwrap(), None);
    }

    #[test]
    fn legacy_write_omits_note() {
        let record = DayRecord::new(["pushup"], "kept locally");
        let body = WriteRequest {
            day: day_key(2),
            tasks: record.tasks(),
            note: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "day": "day3", "tasks": ["pushup"] })
        );
    }
}
