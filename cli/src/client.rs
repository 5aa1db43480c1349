//! HTTP client for a running knowgraph server

use reqwest::{Client, Url};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Error body returned by the server
    #[error("{status} {error}: {message}")]
    Api {
        status: u16,
        error: String,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

pub struct RemoteClient {
    base_url: String,
    http_client: Client,
}

impl RemoteClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: Client::new(),
        }
    }

    fn url(&self, segments: &[&str], query: &[(&str, Option<String>)]) -> ClientResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        let present: Vec<(&str, &str)> = query
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (*k, v)))
            .collect();
        if !present.is_empty() {
            url.query_pairs_mut().extend_pairs(present);
        }
        Ok(url)
    }

    /// GET a JSON document; non-2xx answers become [`ClientError::Api`]
    pub async fn get(&self, segments: &[&str], query: &[(&str, Option<String>)]) -> ClientResult<Value> {
        let url = self.url(segments, query)?;
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body: Value = response
            .json()
            .await
            .unwrap_or_else(|_| serde_json::json!({"error": "unknown", "message": "Unknown error"}));
        let field = |key: &str| {
            body.get(key)
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string()
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            error: field("error"),
            message: field("message"),
        })
    }
}
