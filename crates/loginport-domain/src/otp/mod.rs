use crate::shared::DomainError;

/// Produces the MFA code for a shared secret at the current moment.
///
/// No caching: every call recomputes from the clock.
pub trait OtpGenerator: Send + Sync {
    fn generate(&self, secret: &str) -> Result<String, DomainError>;
}
