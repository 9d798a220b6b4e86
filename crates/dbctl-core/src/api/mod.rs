//! Control-plane database API
//!
//! [`DatabaseApi`] has one method per endpoint under
//! `/v1alpha1/{organization}/databases`. [`HttpDatabaseApi`] is the real
//! implementation; tests provide their own.

use async_trait::async_trait;

use crate::credentials::Credentials;
use crate::error::Result;

mod http;
mod types;

pub use http::{DEFAULT_TIMEOUT, HttpDatabaseApi, USER_AGENT};
pub use types::{
    CreateDatabaseRequest, DatabaseInstanceRecord, InstanceStatus, LinkDatabaseRequest,
    ResetCredentialsRequest, RestoreDatabaseRequest,
};

/// Target host plus the credentials for one request
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub host: String,
    pub credentials: Credentials,
}

impl RequestContext {
    pub fn new(host: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            host: host.into(),
            credentials,
        }
    }
}

#[async_trait]
pub trait DatabaseApi: Send + Sync {
    /// POST /userdb
    async fn create_database(&self, ctx: &RequestContext, request: &CreateDatabaseRequest)
    -> Result<()>;

    /// POST /byod
    async fn link_database(&self, ctx: &RequestContext, request: &LinkDatabaseRequest)
    -> Result<()>;

    /// DELETE /userdb/{name}
    async fn delete_database(&self, ctx: &RequestContext, name: &str) -> Result<()>;

    /// DELETE /byod/{name}
    async fn unlink_database(&self, ctx: &RequestContext, name: &str) -> Result<()>;

    /// GET /userdb/info/{name}
    async fn get_instance(&self, ctx: &RequestContext, name: &str)
    -> Result<DatabaseInstanceRecord>;

    /// GET (base)
    async fn list_instances(&self, ctx: &RequestContext) -> Result<Vec<DatabaseInstanceRecord>>;

    /// POST /userdb/{name}/credentials
    async fn reset_credentials(
        &self,
        ctx: &RequestContext,
        name: &str,
        request: &ResetCredentialsRequest,
    ) -> Result<()>;

    /// POST /userdb/{name}/restore
    async fn restore_database(
        &self,
        ctx: &RequestContext,
        name: &str,
        request: &RestoreDatabaseRequest,
    ) -> Result<()>;
}
