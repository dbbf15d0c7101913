//! Upload collaborator: posts an image to the detection service and returns
//! the decoded JSON body. Normalization happens elsewhere, and only on a
//! body that decoded successfully.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Message used when the service fails without a usable `detail`.
pub const DEFAULT_ERROR_DETAIL: &str = "Error predicting image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// Flower detection followed by disease classification.
    Analyze,
    /// Whole-image classifier returning the legacy shape.
    Predict,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Analyze => "/analyze",
            Endpoint::Predict => "/predict",
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to read image {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned {status}: {detail}")]
    Service { status: u16, detail: String },

    #[error("response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

pub struct AnalysisClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl AnalysisClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::blocking::ClientBuilder::new().build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::blocking::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Upload one image as multipart field `file` and decode the JSON reply.
    pub fn analyze(&self, image: &Path, endpoint: Endpoint) -> Result<Value, ClientError> {
        let form = reqwest::blocking::multipart::Form::new()
            .file("file", image)
            .map_err(|source| ClientError::Io {
                path: image.display().to_string(),
                source,
            })?;

        let url = self.url(endpoint);
        log::info!("uploading {} to {}", image.display(), url);

        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| e.without_url())?;

        let status = resp.status();
        log::debug!("{} responded with {}", url, status);

        let body = resp.bytes().map_err(|e| e.without_url())?;

        if !status.is_success() {
            return Err(ClientError::Service {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

/// Pull the human-readable `detail` out of an error body.
pub fn error_detail(body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Null) | None => DEFAULT_ERROR_DETAIL.to_string(),
            Some(Value::String(_)) => DEFAULT_ERROR_DETAIL.to_string(),
            Some(other) => other.to_string(),
        },
        _ => DEFAULT_ERROR_DETAIL.to_string(),
    }
}
