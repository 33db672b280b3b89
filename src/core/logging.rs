use std::{
    fs::OpenOptions,
    path::PathBuf,
    sync::Arc,
};

use tracing_subscriber::EnvFilter;

use crate::core::AnkifillError;

pub const LOG_FILE: &str = "ankifill_log.txt";

/// Route tracing output to the run log next to the binary's working directory.
/// Console progress stays on plain stdout, so the file gets the full record
/// (timestamp, level, file:line) without ANSI noise.
pub fn init() -> Result<PathBuf, AnkifillError> {
    let path = PathBuf::from(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(Arc::new(file))
        .init();

    Ok(path)
}
