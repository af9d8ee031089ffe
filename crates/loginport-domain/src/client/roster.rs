use super::aggregate::{ClientField, ClientRecord};
use crate::shared::DomainError;

/// The in-memory list of client records served for one server lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientRoster {
    clients: Vec<ClientRecord>,
}

impl ClientRoster {
    pub fn new(clients: Vec<ClientRecord>) -> Self {
        Self { clients }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn clients(&self) -> &[ClientRecord] {
        &self.clients
    }

    /// First record whose display name matches exactly.
    pub fn find_by_name(&self, name: &str) -> Option<&ClientRecord> {
        self.clients.iter().find(|c| c.name() == name)
    }

    /// Apply an in-place edit to the first record with the given account id.
    ///
    /// The account is resolved before the field name, so an unknown account
    /// is `NotFound` whatever the field. Leaves the roster untouched on error.
    pub fn update_field(
        &mut self,
        account: &str,
        field: &str,
        value: impl Into<String>,
    ) -> Result<ClientField, DomainError> {
        let client = self
            .clients
            .iter_mut()
            .find(|c| c.account() == account)
            .ok_or_else(|| DomainError::NotFound(format!("No client with account {}", account)))?;

        let field = field.parse::<ClientField>()?;
        client.set_field(field, value);
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, account: &str) -> ClientRecord {
        ClientRecord::new(name, account, "user", "pass", "JBSWY3DPEHPK3PXP").unwrap()
    }

    #[test]
    fn test_find_by_name() {
        let roster = ClientRoster::new(vec![record("a-prod-x", "1"), record("b-dev-y", "2")]);
        assert_eq!(roster.find_by_name("b-dev-y").unwrap().account(), "2");
        assert!(roster.find_by_name("missing").is_none());
    }

    #[test]
    fn test_update_unknown_account_leaves_roster_unchanged() {
        let mut roster = ClientRoster::new(vec![record("a", "1")]);
        let before = roster.clone();

        let result = roster.update_field("999", "password", "new");

        assert!(matches!(result, Err(DomainError::NotFound(_))));
        assert_eq!(roster, before);
    }

    #[test]
    fn test_update_password_touches_only_that_field() {
        let mut roster = ClientRoster::new(vec![record("a", "1"), record("b", "2")]);

        roster
            .update_field("2", "password", "rotated")
            .unwrap();

        let other = &roster.clients()[0];
        assert_eq!(other.password(), "pass");

        let edited = &roster.clients()[1];
        assert_eq!(edited.password(), "rotated");
        assert_eq!(edited.name(), "b");
        assert_eq!(edited.account(), "2");
        assert_eq!(edited.username(), "user");
        assert_eq!(edited.mfa_secret(), "JBSWY3DPEHPK3PXP");
    }

    #[test]
    fn test_unknown_account_wins_over_unknown_field() {
        let mut roster = ClientRoster::new(vec![record("a", "1")]);

        let result = roster.update_field("999", "region", "x");

        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[test]
    fn test_unknown_field_on_known_account_is_rejected() {
        let mut roster = ClientRoster::new(vec![record("a", "1")]);
        let before = roster.clone();

        let result = roster.update_field("1", "region", "x");

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(roster, before);
    }

    #[test]
    fn test_update_first_match_only() {
        let mut roster = ClientRoster::new(vec![record("a", "1"), record("b", "1")]);
        roster.update_field("1", "name", "renamed").unwrap();
        assert_eq!(roster.clients()[0].name(), "renamed");
        assert_eq!(roster.clients()[1].name(), "b");
    }
}
