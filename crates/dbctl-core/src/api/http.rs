//! reqwest-backed implementation of [`DatabaseApi`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use super::types::{
    CreateDatabaseRequest, DatabaseInstanceRecord, LinkDatabaseRequest, ResetCredentialsRequest,
    RestoreDatabaseRequest,
};
use super::{DatabaseApi, RequestContext};
use crate::error::{CoreError, Result, classify_response};

/// User agent string for dbctl HTTP requests
pub const USER_AGENT: &str = concat!("dbctl/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const API_VERSION: &str = "v1alpha1";

/// Talks to the control plane over HTTPS
#[derive(Debug, Clone)]
pub struct HttpDatabaseApi {
    client: reqwest::Client,
}

impl HttpDatabaseApi {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Build `https://{host}/v1alpha1/{organization}/databases/{segments...}`.
    ///
    /// A host that already carries an `http://` or `https://` scheme is used
    /// verbatim. Segments are percent-encoded.
    pub fn endpoint(ctx: &RequestContext, segments: &[&str]) -> Result<Url> {
        let base = if ctx.host.starts_with("http://") || ctx.host.starts_with("https://") {
            ctx.host.clone()
        } else {
            format!("https://{}", ctx.host)
        };

        let invalid_host = |reason: String| {
            CoreError::Validation(format!("Invalid host '{}': {}", ctx.host, reason))
        };

        let mut url = Url::parse(&base).map_err(|e| invalid_host(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid_host("cannot be used as a base URL".to_string()))?
            .pop_if_empty()
            .extend([API_VERSION, ctx.credentials.organization.as_str(), "databases"])
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, ctx: &RequestContext, segments: &[&str]) -> Result<RequestBuilder> {
        let url = Self::endpoint(ctx, segments)?;
        debug!("{} {}", method, url);
        Ok(self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&ctx.credentials.token))
    }

    /// Send and return the body of a successful response
    async fn execute(&self, builder: RequestBuilder) -> Result<String> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        trace!("Response {} ({} bytes)", status, body.len());

        if status.is_success() {
            Ok(body)
        } else {
            Err(classify_response(status.as_u16(), &body))
        }
    }

    fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
        serde_json::from_str(body).map_err(|e| CoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DatabaseApi for HttpDatabaseApi {
    async fn create_database(
        &self,
        ctx: &RequestContext,
        request: &CreateDatabaseRequest,
    ) -> Result<()> {
        let builder = self.request(Method::POST, ctx, &["userdb"])?.json(request);
        self.execute(builder).await?;
        Ok(())
    }

    async fn link_database(&self, ctx: &RequestContext, request: &LinkDatabaseRequest) -> Result<()> {
        let builder = self.request(Method::POST, ctx, &["byod"])?.json(request);
        self.execute(builder).await?;
        Ok(())
    }

    async fn delete_database(&self, ctx: &RequestContext, name: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, ctx, &["userdb", name])?;
        self.execute(builder).await?;
        Ok(())
    }

    async fn unlink_database(&self, ctx: &RequestContext, name: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, ctx, &["byod", name])?;
        self.execute(builder).await?;
        Ok(())
    }

    async fn get_instance(&self, ctx: &RequestContext, name: &str) -> Result<DatabaseInstanceRecord> {
        let builder = self.request(Method::GET, ctx, &["userdb", "info", name])?;
        let body = self.execute(builder).await?;
        Self::decode(&body)
    }

    async fn list_instances(&self, ctx: &RequestContext) -> Result<Vec<DatabaseInstanceRecord>> {
        let builder = self.request(Method::GET, ctx, &[])?;
        let body = self.execute(builder).await?;
        Self::decode(&body)
    }

    async fn reset_credentials(
        &self,
        ctx: &RequestContext,
        name: &str,
        request: &ResetCredentialsRequest,
    ) -> Result<()> {
        let builder = self
            .request(Method::POST, ctx, &["userdb", name, "credentials"])?
            .json(request);
        self.execute(builder).await?;
        Ok(())
    }

    async fn restore_database(
        &self,
        ctx: &RequestContext,
        name: &str,
        request: &RestoreDatabaseRequest,
    ) -> Result<()> {
        let builder = self
            .request(Method::POST, ctx, &["userdb", name, "restore"])?
            .json(request);
        self.execute(builder).await?;
        Ok(())
    }
}
