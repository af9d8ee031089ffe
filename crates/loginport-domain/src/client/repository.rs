use async_trait::async_trait;

use super::aggregate::ClientRecord;
use crate::shared::DomainError;

/// Where the roster comes from.
///
/// Implementations fetch the full list in one go; there is no incremental
/// update and no write-back.
#[async_trait]
pub trait ClientSource: Send + Sync {
    async fn load_clients(&self) -> Result<Vec<ClientRecord>, DomainError>;
}
