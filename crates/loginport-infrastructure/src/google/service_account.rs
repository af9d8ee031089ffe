use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use log::{debug, info};
use loginport_domain::DomainError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::status::ensure_success;

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets.readonly",
    "https://www.googleapis.com/auth/drive.readonly",
];

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Supplies OAuth2 bearer tokens for Google API calls.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, DomainError>;
}

/// The fields of a service-account key file that the token exchange needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, DomainError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Configuration(format!(
                "Failed to read service-account key {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, DomainError> {
        serde_json::from_str(content).map_err(|e| {
            DomainError::Configuration(format!("Invalid service-account key: {}", e))
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// JWT-bearer token exchange for a service account.
pub struct ServiceAccountTokenProvider {
    http: Client,
    key: ServiceAccountKey,
    token_uri: String,
}

impl ServiceAccountTokenProvider {
    pub fn new(http: Client, key: ServiceAccountKey) -> Self {
        let token_uri = key.token_uri.clone();
        Self {
            http,
            key,
            token_uri,
        }
    }

    /// Send the exchange somewhere other than the key's `token_uri`.
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }

    /// Signed RS256 assertion valid for one hour from `now`.
    pub fn signed_assertion(&self, now: i64) -> Result<String, DomainError> {
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: SCOPES.join(" "),
            aud: self.key.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| DomainError::Configuration(format!("Invalid private key: {}", e)))?;

        jsonwebtoken::encode(&header, &claims, &encoding_key)
            .map_err(|e| DomainError::Configuration(format!("Failed to sign assertion: {}", e)))
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<String, DomainError> {
        let assertion = self.signed_assertion(chrono::Utc::now().timestamp())?;

        debug!("Requesting access token for {}", self.key.client_email);
        let response = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await
            .map_err(|e| DomainError::Infrastructure(format!("Token request failed: {}", e)))?;

        let response = ensure_success(response, "token exchange").await.map_err(|e| match e {
            // A rejected assertion means the key itself is wrong.
            DomainError::NotFound(msg) | DomainError::Validation(msg) => {
                DomainError::Configuration(msg)
            }
            other => other,
        })?;

        let token: TokenResponse = response.json().await.map_err(|e| {
            DomainError::Infrastructure(format!("Invalid token response: {}", e))
        })?;

        info!("🔑 Authenticated as {}", self.key.client_email);
        Ok(token.access_token)
    }
}

/// Fixed token, for callers that already hold one.
pub struct StaticTokenProvider(pub String);

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, DomainError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parsing_defaults_token_uri() {
        let key = ServiceAccountKey::from_json(
            r#"{"type":"service_account","client_email":"bot@p.iam.gserviceaccount.com","private_key":"pem"}"#,
        )
        .unwrap();
        assert_eq!(key.client_email, "bot@p.iam.gserviceaccount.com");
        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
        assert!(key.private_key_id.is_none());
    }

    #[test]
    fn test_key_missing_fields_is_configuration_error() {
        let err = ServiceAccountKey::from_json(r#"{"client_email":"x"}"#).unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
    }

    #[test]
    fn test_bad_pem_is_configuration_error() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"x@y","private_key":"not a pem"}"#,
        )
        .unwrap();
        let provider = ServiceAccountTokenProvider::new(Client::new(), key);
        assert!(matches!(
            provider.signed_assertion(0),
            Err(DomainError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticTokenProvider("abc".to_string());
        assert_eq!(provider.access_token().await.unwrap(), "abc");
    }
}
