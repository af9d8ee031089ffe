use loginport_domain::otp::OtpGenerator;
use std::sync::Arc;

use crate::application::services::{ClientStore, LoginSequencer};

/// Shared handler state for one server lifetime
#[derive(Clone)]
pub struct AppState {
    pub clients: ClientStore,
    pub sequencer: Arc<LoginSequencer>,
    pub otp: Arc<dyn OtpGenerator>,
}

impl AppState {
    pub fn new(
        clients: ClientStore,
        sequencer: Arc<LoginSequencer>,
        otp: Arc<dyn OtpGenerator>,
    ) -> Self {
        Self {
            clients,
            sequencer,
            otp,
        }
    }
}
