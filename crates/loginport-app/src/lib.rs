//! AWS LoginPort: serves the client roster on localhost and drives console
//! sign-ins in a dedicated Chromium window.

pub mod application;
pub mod presentation;
pub mod shell;
