//! HTTP binding for [`TemplateApi`]
//!
//! Wraps the platform's `/api/v2` template routes using [`reqwest`].

use crate::api::TemplateApi;
use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use tpl_sdk::{Response, Template, TemplateDausResponse, TemplateVersion, WorkspaceResource};

/// Header carrying the session token
pub const SESSION_TOKEN_HEADER: &str = "Coder-Session-Token";

/// HTTP client for one platform deployment
#[derive(Debug, Clone)]
pub struct HttpTemplateApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTemplateApi {
    /// Build a client from configuration
    ///
    /// # Errors
    /// - `ConfigError::Invalid` if the configuration fails validation
    /// - `ConfigError::Client` if the underlying client cannot be built
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.session_token {
            let mut value = HeaderValue::from_str(token).map_err(|e| ConfigError::Invalid {
                field: "session_token",
                reason: e.to_string(),
            })?;
            value.set_sensitive(true);
            headers.insert(SESSION_TOKEN_HEADER, value);
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Self::with_client(client, &config.base_url)
    }

    /// Build around an existing [`reqwest::Client`] (useful for sharing a
    /// connection pool); the caller is responsible for auth headers
    ///
    /// # Errors
    /// - `ConfigError::Invalid` if `base_url` is not an absolute http(s) URL
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url.trim()).map_err(|e| ConfigError::Invalid {
            field: "base_url",
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::Invalid {
                field: "base_url",
                reason: "not a base URL".to_string(),
            });
        }
        Ok(Self { client, base_url })
    }

    /// Deployment root this client talks to
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for `/api/v2/{segments...}`, escaping each segment
    #[must_use]
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v2"]).extend(segments);
        }
        url
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments);
        tracing::debug!(%method, %url, "api request");

        let response = self.client.request(method.clone(), url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = decode_error(status, &body);
            tracing::warn!(
                %method,
                %url,
                status = status.as_u16(),
                error = %err,
                "api request failed"
            );
            return Err(err);
        }

        Ok(response.json::<T>().await?)
    }

    async fn send(&self, method: Method, segments: &[&str]) -> Result<(), ApiError> {
        let url = self.endpoint(segments);
        tracing::debug!(%method, %url, "api request");

        let response = self.client.request(method.clone(), url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = decode_error(status, &body);
            tracing::warn!(
                %method,
                %url,
                status = status.as_u16(),
                error = %err,
                "api request failed"
            );
            return Err(err);
        }
        Ok(())
    }
}

/// Turn a non-success response into an [`ApiError`]
///
/// Bodies that are not a platform [`Response`] fall back to the raw text, or
/// the status line when the body is empty.
#[must_use]
pub fn decode_error(status: StatusCode, body: &str) -> ApiError {
    let body = serde_json::from_str::<Response>(body).unwrap_or_else(|_| {
        let text = body.trim();
        if text.is_empty() {
            Response::message(status.to_string())
        } else {
            Response::message(text)
        }
    });
    ApiError::Response {
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl TemplateApi for HttpTemplateApi {
    async fn fetch_template(
        &self,
        organization_id: &str,
        template_name: &str,
    ) -> Result<Template, ApiError> {
        self.request(
            Method::GET,
            &["organizations", organization_id, "templates", template_name],
        )
        .await
    }

    async fn fetch_active_version(&self, template: &Template) -> Result<TemplateVersion, ApiError> {
        self.request(Method::GET, &["templateversions", &template.active_version_id])
            .await
    }

    async fn fetch_template_resources(
        &self,
        template: &Template,
    ) -> Result<Vec<WorkspaceResource>, ApiError> {
        self.request(
            Method::GET,
            &["templateversions", &template.active_version_id, "resources"],
        )
        .await
    }

    async fn fetch_template_versions(
        &self,
        template: &Template,
    ) -> Result<Vec<TemplateVersion>, ApiError> {
        self.request(Method::GET, &["templates", &template.id, "versions"])
            .await
    }

    async fn fetch_template_daus(
        &self,
        template: &Template,
    ) -> Result<TemplateDausResponse, ApiError> {
        self.request(Method::GET, &["templates", &template.id, "daus"])
            .await
    }

    async fn delete_template(&self, template: &Template) -> Result<Template, ApiError> {
        // The route answers with a bare message; echo the entity we deleted.
        self.send(Method::DELETE, &["templates", &template.id]).await?;
        Ok(template.clone())
    }
}
