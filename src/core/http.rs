use std::time::Duration;

use reqwest::blocking::Client;

use crate::core::AnkifillError;

pub fn http_client() -> Result<Client, AnkifillError> {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .map_err(|e| AnkifillError::Custom(format!("HTTP client build failed: {e}")))
}
