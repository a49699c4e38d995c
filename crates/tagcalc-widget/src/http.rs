//! Autocomplete client for native hosts.
//!
//! The editor never awaits; a host drives it like this:
//!
//! ```ignore
//! if let Some(request) = editor.input("rev") {
//!     let result = client.fetch(&request.query).await;
//!     editor.receive_suggestions(&request, result);
//! }
//! ```

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::config::WidgetConfig;
use crate::suggest::{Candidate, SuggestError};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HttpSuggestionClient {
    url: String,
    http: Client,
}

impl HttpSuggestionClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SuggestError> {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(timeout);
        #[cfg(target_arch = "wasm32")]
        let _ = timeout;

        let http = builder
            .build()
            .map_err(|e| SuggestError::Transport(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            http,
        })
    }

    pub fn from_config(config: &WidgetConfig) -> Result<Self, SuggestError> {
        Self::new(config.suggestion_url.clone(), DEFAULT_TIMEOUT)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// `GET {url}?search={query}`, expecting a JSON array of candidates.
    pub async fn fetch(&self, query: &str) -> Result<Vec<Candidate>, SuggestError> {
        debug!(query, url = %self.url, "fetching suggestions");
        let response = self
            .http
            .get(&self.url)
            .query(&[("search", query)])
            .send()
            .await
            .map_err(|e| SuggestError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SuggestError::Status(status.as_u16()));
        }

        response
            .json::<Vec<Candidate>>()
            .await
            .map_err(|e| SuggestError::Decode(e.to_string()))
    }
}
