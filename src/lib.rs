pub mod anki;
pub mod config;
pub mod core;
pub mod enrichment;

pub use crate::config::Config;
pub use crate::core::AnkifillError;
