//! HTTP client for network-based API calls

use crate::{ClientConfig, ClientError, ClientResult};
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::dto::ErrorBody;

/// HTTP client for making network requests to the defect backend
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout_duration())
            .build()?;

        Ok(Self {
            client,
            base_url: config.normalized_base_url().to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path, each segment percent-encoded
    ///
    /// `&["api", "capture-points", id]` never lets `id` add segments or a
    /// query string.
    pub fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build authorization header value
    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_header() {
            Some(auth) => request.header(reqwest::header::AUTHORIZATION, auth),
            None => request,
        }
    }

    /// Make a GET request; `None` when the server answers 204 or an empty body
    pub async fn get_optional<T: DeserializeOwned>(&self, path: &[&str]) -> ClientResult<Option<T>> {
        let request = self.authorize(self.client.get(self.endpoint(path)?));
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a GET request that must return a body
    pub async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> ClientResult<T> {
        self.get_optional(path).await?.ok_or_else(|| {
            ClientError::InvalidResponse(format!("empty body from /{}", path.join("/")))
        })
    }

    /// Make a PATCH request with JSON body, ignoring any response body
    pub async fn patch<B: Serialize + ?Sized>(&self, path: &[&str], body: &B) -> ClientResult<()> {
        let request = self.authorize(self.client.patch(self.endpoint(path)?).json(body));
        let response = request.send().await?;
        Self::handle_response::<serde_json::Value>(response).await?;
        Ok(())
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<Option<T>> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(error_for_status(status, &text));
        }

        parse_body(status, &text)
    }
}

/// Decode a success body; 204 and blank bodies carry no value
pub fn parse_body<T: DeserializeOwned>(status: StatusCode, text: &str) -> ClientResult<Option<T>> {
    if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text).map(Some).map_err(Into::into)
}

/// Map a non-success response to a client error
///
/// A `{ "errors": [...] }` body wins over the bare status mapping.
pub fn error_for_status(status: StatusCode, text: &str) -> ClientError {
    if let Ok(body) = serde_json::from_str::<ErrorBody>(text)
        && let Some(message) = body.summary()
    {
        return ClientError::Api {
            status: status.as_u16(),
            message,
        };
    }

    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden(text.to_string()),
        StatusCode::NOT_FOUND => ClientError::NotFound(text.to_string()),
        StatusCode::BAD_REQUEST => ClientError::Validation(text.to_string()),
        _ => ClientError::Internal(format!("{}: {}", status, text)),
    }
}
