mod timeouts;

pub use timeouts::LoginTimeouts;
