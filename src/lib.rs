pub mod cli;
pub mod config;
pub mod cycle;
pub mod delimited;
pub mod error;
pub mod fetch;
pub mod notify;
pub mod report;
pub mod store;
pub mod table;

pub use error::{Error, Result};
