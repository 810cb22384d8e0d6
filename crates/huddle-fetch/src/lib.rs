//! HTTP data source for Huddle
//!
//! Implements [`DataSource`] over `reqwest`, so the resolver's model hooks can
//! load JSON from the chat backend. Relative URLs are joined onto a base URL;
//! an optional session token is sent as a bearer credential.

use std::time::Duration;

use async_trait::async_trait;
use huddle_core::capability::{DataSource, FetchOptions, Method};
use huddle_core::errors::{FetchError, HuddleError, Result};
use huddle_core_types::Sensitive;
use serde_json::Value;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `reqwest`-backed [`DataSource`]
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    client: reqwest::Client,
    base_url: String,
    token: Option<Sensitive<String>>,
}

impl HttpDataSource {
    /// Create a data source resolving relative URLs against `base_url`
    ///
    /// # Errors
    ///
    /// Returns `Config` for an empty base URL and `Internal` if the HTTP
    /// client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(HuddleError::Config {
                reason: "base_url must not be empty".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| HuddleError::Internal {
                message: error.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Send `token` as a bearer credential on every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(Sensitive::new(token.into()));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `url`; absolute inputs are returned unchanged
    pub fn url_for(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        format!("{}/{}", self.base_url, url.trim_start_matches('/'))
    }

    fn request(&self, url: &str, options: &FetchOptions) -> reqwest::RequestBuilder {
        let builder = match options.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        };
        let builder = builder.header("Accept", "application/json");
        let builder = match &self.token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        };
        match &options.body {
            Some(body) => builder.json(body),
            None => builder,
        }
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch_json(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> std::result::Result<Value, FetchError> {
        let full_url = self.url_for(url);
        tracing::debug!(
            op = "fetch_json",
            method = options.method.as_str(),
            url = %full_url,
        );

        let response = self
            .request(&full_url, options)
            .send()
            .await
            .map_err(|error| FetchError::Network {
                url: full_url.clone(),
                message: error.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(op = "fetch_json", url = %full_url, status = status.as_u16());
            return Err(FetchError::HttpStatus {
                url: full_url,
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|error| FetchError::Decode {
                url: full_url,
                message: error.to_string(),
            })
    }
}
