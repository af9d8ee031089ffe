use loginport_domain::client::{ClientField, ClientRecord, ClientRoster};
use loginport_domain::DomainError;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The roster shared by all request handlers for one server lifetime.
#[derive(Debug, Clone, Default)]
pub struct ClientStore {
    roster: Arc<RwLock<ClientRoster>>,
}

impl ClientStore {
    pub fn new(clients: Vec<ClientRecord>) -> Self {
        Self {
            roster: Arc::new(RwLock::new(ClientRoster::new(clients))),
        }
    }

    pub async fn len(&self) -> usize {
        self.roster.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.roster.read().await.is_empty()
    }

    pub async fn snapshot(&self) -> Vec<ClientRecord> {
        self.roster.read().await.clients().to_vec()
    }

    pub async fn find_by_name(&self, name: &str) -> Option<ClientRecord> {
        self.roster.read().await.find_by_name(name).cloned()
    }

    /// Edit one field of the first record with `account`.
    pub async fn update_field(
        &self,
        account: &str,
        field: &str,
        value: String,
    ) -> Result<ClientField, DomainError> {
        self.roster.write().await.update_field(account, field, value)
    }
}
