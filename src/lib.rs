// Just Label It - Library Entry Point

pub mod commands;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod scanner;
pub mod store;

pub use config::LibraryConfig;
pub use error::{JliError, Result};
pub use store::{IngestSummary, Store};
