//! Blocking HTTP client for the prediction server.

use crate::upload::ImageUpload;
use reqwest::StatusCode;
use reqwest::blocking::{Client, multipart};
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(StatusCode),
    #[error("server reported status {0:?}")]
    Unhealthy(String),
}

/// Raw server answer plus the client-measured round trip.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub payload: Value,
    pub round_trip: Duration,
}

pub struct PredictionClient {
    http: Client,
    endpoint: String,
}

impl PredictionClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_http(endpoint, http))
    }

    /// Uses a preconfigured `reqwest` client (proxy, TLS, timeouts).
    pub fn with_http(endpoint: impl Into<String>, http: Client) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), path)
    }

    /// Posts the image as form field `file` to `/predict`.
    pub fn predict(&self, upload: ImageUpload) -> Result<Prediction, ClientError> {
        let url = self.url("predict");
        let size = upload.bytes.len();
        let mime = upload.mime_type();
        let part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(mime)?;
        let form = multipart::Form::new().part("file", part);

        tracing::info!(%url, bytes = size, "uploading image");
        let started = Instant::now();
        let response = self.http.post(&url).multipart(form).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }
        let payload: Value = response.json()?;
        let round_trip = started.elapsed();
        tracing::info!(%status, elapsed_ms = round_trip.as_millis() as u64, "prediction received");

        Ok(Prediction {
            payload,
            round_trip,
        })
    }

    /// Succeeds when `/health` answers `{"status": "ok"}`.
    pub fn health(&self) -> Result<(), ClientError> {
        let response = self.http.get(self.url("health")).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }
        let body: Value = response.json()?;
        match body.get("status").and_then(Value::as_str) {
            Some("ok") => Ok(()),
            other => Err(ClientError::Unhealthy(other.unwrap_or("missing").to_string())),
        }
    }
}
