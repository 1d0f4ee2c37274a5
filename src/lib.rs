//! Recognize text, LaTeX and HTML in an image with the Mathpix OCR API.

use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use thiserror::Error;
use tracing::{info, warn};

pub mod cli;
pub mod client;
pub mod config;
pub mod format;
pub mod result;

pub use cli::{Cli, Invocation};
pub use client::MathpixClient;
pub use config::Config;
pub use format::{render, OutputFormat, OutputMode};
pub use result::OcrResult;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("{0}")]
    Usage(String),

    #[error("API key not found, set APIKEY in the .env file")]
    MissingApiKey,

    #[error("cannot read image file {}: {source}", .path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("API request failed: {} {}", .status.as_u16(), .status.canonical_reason().unwrap_or(""))]
    Api { status: StatusCode, body: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl OcrError {
    /// Process exit code for this error. Every failure currently maps to 1.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

pub type Result<T> = std::result::Result<T, OcrError>;

/// Runs one invocation against the Mathpix endpoint with the `.env` found in
/// `workdir`. Returns what should be printed to stdout, if anything.
pub async fn run(invocation: &Invocation, workdir: &Path) -> Result<Option<String>> {
    run_against(invocation, workdir, config::MATHPIX_TEXT_ENDPOINT).await
}

pub async fn run_against(
    invocation: &Invocation,
    workdir: &Path,
    endpoint: &str,
) -> Result<Option<String>> {
    let image_path = &invocation.image_path;
    if !cli::has_supported_extension(image_path) {
        warn!("file may not be a supported image format (PNG, JPG, JPEG)");
    }

    let config = Config::from_env_file(workdir)?
        .with_endpoint(endpoint)
        .with_timeout(invocation.timeout);

    info!("Processing image: {}", image_path.display());
    let encoded = client::encode_image(image_path).await?;

    let client = MathpixClient::new(&config)?;
    let result = client.recognize(&encoded).await?;

    let mode = OutputMode::select(invocation.text_only, &invocation.output_format);
    Ok(render(&result, &mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_carries_status_code_and_reason() {
        let err = OcrError::Api {
            status: StatusCode::UNAUTHORIZED,
            body: "{\"error\":\"Invalid credentials\"}".to_string(),
        };
        assert_eq!(err.to_string(), "API request failed: 401 Unauthorized");
    }

    #[test]
    fn image_read_error_names_the_path() {
        let err = OcrError::ImageRead {
            path: PathBuf::from("missing/scan.png"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("missing/scan.png"));
    }

    #[test]
    fn every_error_exits_with_one() {
        assert_eq!(OcrError::MissingApiKey.exit_code(), 1);
        assert_eq!(OcrError::Usage("no image".to_string()).exit_code(), 1);
    }
}
