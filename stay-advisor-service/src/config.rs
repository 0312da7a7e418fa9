use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Service settings loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub summary_dataset_path: PathBuf,
    pub detailed_dataset_path: PathBuf,
    pub log_format: String,
    /// Most recommendation outcomes kept for `GET /recommendations/{id}`.
    pub store_capacity: usize,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            summary_dataset_path: env::var("SUMMARY_DATASET_PATH")
                .unwrap_or_else(|_| "data/listings_summary.json".to_string())
                .into(),
            detailed_dataset_path: env::var("DETAILED_DATASET_PATH")
                .unwrap_or_else(|_| "data/listings_detailed.json".to_string())
                .into(),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string()),
            store_capacity: env::var("STORE_CAPACITY")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .context("STORE_CAPACITY must be a valid number")?,
        })
    }
}
