//! Backend HTTP client

use crate::error::ApiError;
use crate::models::Page;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// Source of the bearer token attached to outgoing requests.
///
/// Read on every request, so a logout is visible to the very next call.
pub trait TokenSource: Send + Sync {
    /// Current access token, if any.
    fn access_token(&self) -> Option<String>;
}

/// Token source for anonymous clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl TokenSource for NoCredentials {
    fn access_token(&self) -> Option<String> {
        None
    }
}

/// Client for the ExpoHub backend REST API.
///
/// Resolves resource paths against a base URL and attaches
/// `Authorization: Bearer <token>` when the token source has one.
/// Requests are never retried.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    tokens: Arc<dyn TokenSource>,
}

impl ApiClient {
    /// Create an anonymous client for the given base URL.
    ///
    /// A missing trailing slash is added, so `http://host/api` and
    /// `http://host/api/` behave the same.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized)
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            http: Client::new(),
            base_url,
            tokens: Arc::new(NoCredentials),
        })
    }

    /// Attach bearer credentials from the given source.
    #[must_use]
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Base URL all paths are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a relative resource path such as `events/3/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the path cannot be joined.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Start a request with credentials attached.
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        let builder = self.http.request(method, url);
        Ok(match self.tokens.access_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Send a request and decode a JSON body.
    pub(crate) async fn fetch_json<T: DeserializeOwned>(
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = Self::check(builder.send().await?).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send a request to a list endpoint, paginated or not.
    pub(crate) async fn fetch_list<T: DeserializeOwned>(
        builder: RequestBuilder,
    ) -> Result<Vec<T>, ApiError> {
        Ok(Self::fetch_json::<Page<T>>(builder).await?.into_items())
    }

    /// Send a request whose body the caller does not need.
    pub(crate) async fn fetch_empty(builder: RequestBuilder) -> Result<(), ApiError> {
        Self::check(builder.send().await?).await?;
        Ok(())
    }

    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_response_body(status.as_u16(), &body);
        tracing::debug!(status = status.as_u16(), path = %url, %error, "Backend rejected request");
        Err(error)
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
