use loginport_domain::otp::OtpGenerator;
use loginport_domain::DomainError;
use totp_rs::{Algorithm, Secret, TOTP};

const DIGITS: usize = 6;
const STEP_SECS: u64 = 30;

/// RFC 6238 code generator (SHA-1, 6 digits, 30 second step).
#[derive(Debug, Clone, Copy, Default)]
pub struct TotpGenerator;

impl TotpGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Code for an explicit unix timestamp.
    pub fn generate_at(&self, secret: &str, unix_secs: u64) -> Result<String, DomainError> {
        Ok(build_totp(secret)?.generate(unix_secs))
    }
}

impl OtpGenerator for TotpGenerator {
    fn generate(&self, secret: &str) -> Result<String, DomainError> {
        build_totp(secret)?
            .generate_current()
            .map_err(|e| DomainError::Infrastructure(format!("System clock error: {}", e)))
    }
}

fn build_totp(secret: &str) -> Result<TOTP, DomainError> {
    let normalized = normalize_secret(secret);
    if normalized.is_empty() {
        return Err(DomainError::Validation("MFA secret is empty".to_string()));
    }

    let bytes = Secret::Encoded(normalized)
        .to_bytes()
        .map_err(|e| DomainError::Validation(format!("Invalid base32 MFA secret: {:?}", e)))?;

    // Unchecked: some issued secrets are shorter than the 128-bit RFC minimum.
    Ok(TOTP::new_unchecked(Algorithm::SHA1, DIGITS, 1, STEP_SECS, bytes))
}

/// Strip whitespace and padding, uppercase.
fn normalize_secret(secret: &str) -> String {
    secret
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // base32("12345678901234567890"), the RFC 6238 SHA-1 seed
    const RFC_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    #[test]
    fn test_rfc6238_vectors() {
        let generator = TotpGenerator::new();
        assert_eq!(generator.generate_at(RFC_SECRET, 59).unwrap(), "287082");
        assert_eq!(generator.generate_at(RFC_SECRET, 1111111109).unwrap(), "081804");
        assert_eq!(generator.generate_at(RFC_SECRET, 1234567890).unwrap(), "005924");
    }

    #[test]
    fn test_same_window_same_code() {
        let generator = TotpGenerator::new();
        let start = generator.generate_at(RFC_SECRET, 1_700_000_010).unwrap();
        let end = generator.generate_at(RFC_SECRET, 1_700_000_039).unwrap();
        assert_eq!(start, end);
    }

    #[test]
    fn test_next_window_differs() {
        let generator = TotpGenerator::new();
        let a = generator.generate_at(RFC_SECRET, 59).unwrap();
        let b = generator.generate_at(RFC_SECRET, 60).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_secret_normalization() {
        let generator = TotpGenerator::new();
        let spaced = "gezd gnbv gy3t qojq gezd gnbv gy3t qojq";
        assert_eq!(generator.generate_at(spaced, 59).unwrap(), "287082");
    }

    #[test]
    fn test_current_code_shape() {
        let code = TotpGenerator::new().generate("JBSWY3DPEHPK3PXP").unwrap();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_invalid_secret_is_validation_error() {
        let generator = TotpGenerator::new();
        assert!(matches!(
            generator.generate("not base32 !!"),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(generator.generate("   "), Err(DomainError::Validation(_))));
    }
}
