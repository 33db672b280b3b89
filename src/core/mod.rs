pub mod errors;
pub mod http;
pub mod logging;
pub mod pipeline;

pub use errors::AnkifillError;
