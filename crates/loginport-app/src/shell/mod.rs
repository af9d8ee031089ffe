// Desktop shell: supervises the server process and edits the config file
pub mod instance_lock;
pub mod opener;
pub mod settings;
pub mod supervisor;

pub use instance_lock::InstanceLock;
pub use supervisor::{run, ReadinessCheck, ServerLog, ServerProcess, SupervisorOptions};
