mod client_store;
mod login_sequencer;

pub use client_store::ClientStore;
pub use login_sequencer::{selectors, LoginSequencer};
