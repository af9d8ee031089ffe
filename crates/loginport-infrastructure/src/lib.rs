// Infrastructure layer - Google APIs, Chromium automation, config, logging

pub mod browser;
pub mod config;
pub mod google;
pub mod logging;
pub mod security;
