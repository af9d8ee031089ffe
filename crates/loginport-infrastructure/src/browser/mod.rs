//! Chromium automation over the DevTools protocol.

mod cleanup;
mod discovery;
mod driver;
mod launcher;
mod navigation;

pub use discovery::find_browser;
pub use driver::ChromiumDriver;
pub use launcher::ChromiumLauncher;
