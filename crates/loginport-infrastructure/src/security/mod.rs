mod totp;

pub use totp::TotpGenerator;
