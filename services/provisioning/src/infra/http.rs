//! Shared HTTP plumbing for the backend adapters.

use anyhow::{Context as _, bail};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::BackendConfig;

/// HTTP client bound to one backend project.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    service_key: String,
    public_key: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.url.trim_end_matches('/').to_owned(),
            service_key: config.service_role_key.clone(),
            public_key: config.public_key().to_owned(),
        }
    }

    /// `{base}{path}` with `query` appended as form-encoded pairs.
    pub(crate) fn url(&self, path: &str, query: &[(&str, &str)]) -> anyhow::Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .with_context(|| format!("invalid backend url for {path}"))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Request authorized with the service key (bypasses row-level security).
    pub(crate) fn service(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Unauthenticated request carrying only the public key.
    pub(crate) fn public(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.public_key)
            .bearer_auth(&self.public_key)
    }

    /// Request made as a signed-in end user (subject to row-level security).
    pub(crate) fn as_user(&self, method: Method, url: Url, access_token: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.public_key)
            .bearer_auth(access_token)
    }
}

/// Error payload shapes returned by the auth service and the table API.
#[derive(Deserialize, Default)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

/// Human-readable message from an error response body.
pub(crate) fn error_message(body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .msg
        .or(parsed.message)
        .or(parsed.error_description)
        .or(parsed.error)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "empty response body".to_owned()
            } else {
                trimmed.to_owned()
            }
        })
}

/// Send the request and turn a non-2xx status into an error carrying the
/// backend's message.
pub(crate) async fn send(request: RequestBuilder) -> anyhow::Result<Response> {
    let response = request.send().await.context("request failed")?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    bail!("{} (HTTP {})", error_message(&body), status.as_u16())
}

/// [`send`] and decode a JSON body.
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> anyhow::Result<T> {
    send(request)
        .await?
        .json::<T>()
        .await
        .context("invalid response body")
}
