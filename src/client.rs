use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::result::OcrResult;
use crate::{OcrError, Result};

/// The request always declares PNG, whatever the file actually holds.
pub const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Reads `path` and returns its bytes base64 encoded.
pub async fn encode_image(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| OcrError::ImageRead {
            path: path.to_path_buf(),
            source,
        })?;

    match image::guess_format(&bytes) {
        Ok(ImageFormat::Png) => {}
        Ok(format) => debug!("image content is {format:?}, request declares PNG"),
        Err(_) => debug!("image content not recognized, request declares PNG"),
    }

    Ok(general_purpose::STANDARD.encode(bytes))
}

pub fn data_url(encoded: &str) -> String {
    format!("{DATA_URL_PREFIX}{encoded}")
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TextRequest {
    pub src: String,
    pub formats: Vec<&'static str>,
    pub data_options: DataOptions,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DataOptions {
    pub include_asciimath: bool,
    pub include_latex: bool,
}

impl TextRequest {
    pub fn new(encoded_image: &str) -> Self {
        Self {
            src: data_url(encoded_image),
            formats: vec!["text", "data", "html"],
            data_options: DataOptions {
                include_asciimath: true,
                include_latex: true,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct MathpixClient {
    client: Client,
    config: Config,
}

impl MathpixClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Sends one `v3/text` request. Failures are returned as is, never retried.
    pub async fn recognize(&self, encoded_image: &str) -> Result<OcrResult> {
        let request = TextRequest::new(encoded_image);

        debug!("Sending OCR request to {}", self.config.endpoint);

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("app_id", &self.config.app_id)
            .header("app_key", &self.config.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        debug!("OCR response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("OCR error response body: {body}");
            return Err(OcrError::Api { status, body });
        }

        match response.json::<Value>().await? {
            Value::Object(fields) => Ok(OcrResult::new(fields)),
            other => Err(OcrError::UnexpectedResponse(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }
}
