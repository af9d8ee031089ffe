pub mod bootstrap;
pub mod error;
pub mod page;
pub mod routes;
pub mod state;

pub use bootstrap::{
    build_app_state, load_roster, run_server, serve, shutdown_signal, ServeOptions, READY_MARKER,
};
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
