use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::shared::DomainError;

/// One AWS account's login profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    name: String,
    account: String,
    username: String,
    password: String,
    mfa_secret: String,
}

impl ClientRecord {
    /// Build a record, trimming every field.
    ///
    /// The four credential fields are mandatory; the display name may be empty.
    pub fn new(
        name: impl Into<String>,
        account: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        mfa_secret: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let record = Self {
            name: name.into().trim().to_string(),
            account: account.into().trim().to_string(),
            username: username.into().trim().to_string(),
            password: password.into().trim().to_string(),
            mfa_secret: mfa_secret.into().trim().to_string(),
        };

        let missing: Vec<&str> = [
            ("username", &record.username),
            ("password", &record.password),
            ("account", &record.account),
            ("mfaSecret", &record.mfa_secret),
        ]
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| *field)
        .collect();

        if !missing.is_empty() {
            return Err(DomainError::Validation(format!(
                "Missing required field(s): {}",
                missing.join(", ")
            )));
        }

        Ok(record)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn mfa_secret(&self) -> &str {
        &self.mfa_secret
    }

    /// Account-scoped console sign-in URL.
    pub fn sign_in_url(&self) -> String {
        format!("https://{}.signin.aws.amazon.com/console", self.account)
    }

    /// Overwrite a single field with an operator-supplied value.
    ///
    /// The value is stored as given; the mandatory-field rule only applies
    /// when records are materialized from the spreadsheet.
    pub fn set_field(&mut self, field: ClientField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ClientField::Name => self.name = value,
            ClientField::Account => self.account = value,
            ClientField::Username => self.username = value,
            ClientField::Password => self.password = value,
            ClientField::MfaSecret => self.mfa_secret = value,
        }
    }
}

/// Fields that can be edited in place from the listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientField {
    Name,
    Account,
    Username,
    Password,
    MfaSecret,
}

impl ClientField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientField::Name => "name",
            ClientField::Account => "account",
            ClientField::Username => "username",
            ClientField::Password => "password",
            ClientField::MfaSecret => "mfaSecret",
        }
    }
}

impl FromStr for ClientField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(ClientField::Name),
            "account" => Ok(ClientField::Account),
            "username" => Ok(ClientField::Username),
            "password" => Ok(ClientField::Password),
            "mfaSecret" => Ok(ClientField::MfaSecret),
            other => Err(DomainError::Validation(format!(
                "Unknown client field: {}",
                other
            ))),
        }
    }
}
