//! Resource contract driven by scenarios and cleanup

use crate::error::OvpResult;
use async_trait::async_trait;
use std::fmt::Debug;

/// Create/fetch/delete operations of one resource kind
///
/// `fetch` of an id that does not exist (or was deleted) must fail with a
/// not-found error, see [`OvpError::is_not_found`](crate::OvpError::is_not_found).
#[async_trait]
pub trait ResourceApi: Send + Sync {
    type Resource: Debug + Send + Sync;

    /// Short name used in logs
    fn kind(&self) -> &'static str;

    /// Build a new resource to create under `name`
    fn template(&self, name: &str) -> Self::Resource;

    fn id_of(resource: &Self::Resource) -> Option<i64>;

    async fn create(&self, resource: Self::Resource) -> OvpResult<Self::Resource>;

    async fn fetch(&self, id: i64) -> OvpResult<Self::Resource>;

    async fn delete(&self, id: i64) -> OvpResult<()>;
}
