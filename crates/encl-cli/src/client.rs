//! HTTP client for the Enclave API.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::auth::AuthProvider;
use crate::{CliConfig, CliError, CliResult};

/// A response reduced to its status code and raw body.
///
/// Every endpoint is surfaced through this one shape; typed bodies are
/// decoded with [`ApiResponse::json`] only after the status was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiResponse {
    /// Returns true for 2xx responses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Human-readable error message from the body.
    pub fn error_message(&self) -> String {
        if let Ok(body) = serde_json::from_str::<ErrorBody>(&self.body) {
            return body.error;
        }
        let trimmed = self.body.trim();
        if trimmed.is_empty() {
            "Unknown error".to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Maps a non-success status to the matching [`CliError`] variant.
    pub fn error_for_status(self) -> CliResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(self.into_error())
        }
    }

    /// Classifies an unsuccessful response.
    pub fn into_error(self) -> CliError {
        let message = self.error_message();
        match self.status {
            401 | 403 => CliError::Auth {
                status: self.status,
                message,
            },
            404 => CliError::NotFound {
                resource_type: "Resource".to_string(),
                id: message,
            },
            500..=599 => CliError::Server {
                status: self.status,
                message,
            },
            status => CliError::Api { status, message },
        }
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> CliResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

impl CliError {
    /// Names the resource a 404 refers to.
    pub fn for_resource(self, resource_type: &str, id: &str) -> Self {
        match self {
            CliError::NotFound { .. } => CliError::NotFound {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
            },
            other => other,
        }
    }
}

/// API client for making requests to the Enclave server.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth: Arc<dyn AuthProvider>,
}

impl ApiClient {
    /// Creates a new API client from the resolved configuration.
    pub fn new(config: &CliConfig) -> CliResult<Self> {
        if config.api_server_url.is_empty() {
            return Err(CliError::Config("API server URL not configured".to_string()));
        }
        let auth = config.require_auth()?.clone();

        Self::with_auth(
            &config.api_server_url,
            Arc::new(auth),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Creates a client with an explicit auth provider.
    pub fn with_auth(
        base_url: &str,
        auth: Arc<dyn AuthProvider>,
        timeout: Duration,
    ) -> CliResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .header(reqwest::header::AUTHORIZATION, self.auth.auth_header())
    }

    async fn read(method: &Method, path: &str, response: reqwest::Response) -> CliResult<ApiResponse> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        tracing::debug!(%method, path, status, "API request completed");
        Ok(ApiResponse { status, body })
    }

    /// Sends a request and returns the raw response, whatever its status.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> CliResult<ApiResponse> {
        let mut request = self.request(method.clone(), path);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        Self::read(&method, path, response).await
    }

    /// Posts a multipart form and decodes the JSON body.
    pub async fn upload<T: DeserializeOwned>(&self, path: &str, form: Form) -> CliResult<T> {
        let response = self.request(Method::POST, path).multipart(form).send().await?;
        Self::read(&Method::POST, path, response)
            .await?
            .error_for_status()?
            .json()
    }

    /// Streams the body of a GET request into `out`, returning the bytes
    /// written. Nothing is written unless the status is a success.
    pub async fn download_to<W: Write>(&self, path: &str, out: &mut W) -> CliResult<u64> {
        let mut response = self.request(Method::GET, path).send().await?;
        if !response.status().is_success() {
            return Err(Self::read(&Method::GET, path, response).await?.into_error());
        }

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            out.write_all(&chunk)?;
            written += chunk.len() as u64;
        }
        out.flush()?;
        tracing::debug!(path, size = written, "Download completed");
        Ok(written)
    }

    /// Makes a GET request and decodes the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> CliResult<T> {
        self.send::<()>(Method::GET, path, None)
            .await?
            .error_for_status()?
            .json()
    }

    /// Makes a POST request, ignoring the response body.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> CliResult<()> {
        self.send(Method::POST, path, Some(body))
            .await?
            .error_for_status()
            .map(|_| ())
    }

    /// Makes a PATCH request, ignoring the response body.
    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> CliResult<()> {
        self.send(Method::PATCH, path, Some(body))
            .await?
            .error_for_status()
            .map(|_| ())
    }

    /// Makes a DELETE request with a JSON body.
    pub async fn delete<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> CliResult<()> {
        self.send(Method::DELETE, path, Some(body))
            .await?
            .error_for_status()
            .map(|_| ())
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
