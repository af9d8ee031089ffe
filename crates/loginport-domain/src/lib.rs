// Domain layer - Pure business logic
// No dependencies on infrastructure or presentation layers

pub mod client;
pub mod login;
pub mod otp;
pub mod shared;

// Re-exports for convenience
pub use shared::{DomainError, ErrorCode, ErrorSeverity};
