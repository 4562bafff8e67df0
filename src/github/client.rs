// GitHub API HTTP client.
// Handles authentication, rate limit tracking, and status-to-error mapping.

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use tracing::debug;

use crate::error::{Result, VitrineError};

use super::types::RateLimit;

const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Authenticated GitHub REST client with rate limit tracking.
pub struct GitHubClient {
    client: Client,
    rate_limit: RateLimit,
}

impl GitHubClient {
    /// Create a client authenticated with the given token.
    pub fn new(token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| VitrineError::Other(e.to_string()))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("vitrine"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(VitrineError::Api)?;

        Ok(Self {
            client,
            rate_limit: RateLimit::default(),
        })
    }

    /// Create a client from the GITHUB_TOKEN environment variable.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("GITHUB_TOKEN").map_err(|_| VitrineError::MissingToken)?;
        Self::new(&token)
    }

    /// Rate limit state as of the last response.
    pub fn rate_limit(&self) -> &RateLimit {
        &self.rate_limit
    }

    /// GET an API endpoint.
    pub async fn get(&mut self, endpoint: &str) -> Result<Response> {
        let url = format!("{GITHUB_API_BASE}{endpoint}");
        debug!(%url, "github request");
        let response = self.client.get(&url).send().await.map_err(VitrineError::Api)?;

        self.track_rate_limit(&response);
        self.check_response(response).await
    }

    /// GET an API endpoint with query parameters.
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &mut self,
        endpoint: &str,
        params: &T,
    ) -> Result<Response> {
        let url = format!("{GITHUB_API_BASE}{endpoint}");
        debug!(%url, "github request");
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(VitrineError::Api)?;

        self.track_rate_limit(&response);
        self.check_response(response).await
    }

    /// GET an API endpoint with a non-default media type, for raw content.
    pub async fn get_media(&mut self, endpoint: &str, accept: &str) -> Result<Response> {
        let url = format!("{GITHUB_API_BASE}{endpoint}");
        debug!(%url, accept, "github request");
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, accept)
            .send()
            .await
            .map_err(VitrineError::Api)?;

        self.track_rate_limit(&response);
        self.check_response(response).await
    }

    /// Update rate limit state from response headers.
    fn track_rate_limit(&mut self, response: &Response) {
        if let Some(limit) = header_u64(response, "x-ratelimit-limit") {
            self.rate_limit.limit = limit;
        }
        if let Some(remaining) = header_u64(response, "x-ratelimit-remaining") {
            self.rate_limit.remaining = remaining;
        }
        if let Some(reset) = header_u64(response, "x-ratelimit-reset") {
            self.rate_limit.reset = reset;
        }
    }

    /// Map non-success statuses to errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED => Err(VitrineError::Unauthorized),
            StatusCode::NOT_FOUND => Err(VitrineError::NotFound(response.url().to_string())),
            StatusCode::FORBIDDEN if self.rate_limit.remaining == 0 => {
                let reset_at = chrono::DateTime::from_timestamp(self.rate_limit.reset as i64, 0)
                    .map(|dt| dt.to_rfc3339())
                    .unwrap_or_else(|| "unknown".to_string());
                Err(VitrineError::RateLimited { reset_at })
            }
            _ => Err(VitrineError::Other(format!(
                "HTTP {status}: {}",
                response.text().await.unwrap_or_default()
            ))),
        }
    }
}

fn header_u64(response: &Response, name: &str) -> Option<u64> {
    response.headers().get(name)?.to_str().ok()?.parse().ok()
}
