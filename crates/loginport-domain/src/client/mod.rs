mod aggregate;
mod repository;
mod roster;
pub mod row_parser;

pub use aggregate::{ClientField, ClientRecord};
pub use repository::ClientSource;
pub use roster::ClientRoster;
pub use row_parser::RowParser;
