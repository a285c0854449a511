//! Image upload to the external image host.
//!
//! The host returns a public URL per image. URLs are treated as opaque
//! strings; the only check is that one came back.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("image upload is not configured")]
    NotConfigured,

    #[error("image is empty")]
    EmptyImage,

    #[error("image is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    #[error("upload request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image host returned no URL")]
    EmptyUrl,
}

#[derive(Debug, Deserialize)]
struct UploadPayload {
    data: UploadData,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    #[serde(default)]
    url: String,
}

/// Client for the image host.
#[derive(Clone)]
pub struct ImageUploader {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ImageUploader {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            api_key,
        }
    }

    /// Upload one image and return its public URL.
    pub async fn upload(&self, bytes: &[u8]) -> Result<String, UploadError> {
        let key = self.api_key.as_deref().ok_or(UploadError::NotConfigured)?;
        if bytes.is_empty() {
            return Err(UploadError::EmptyImage);
        }

        let image = STANDARD.encode(bytes);
        let payload = self
            .http
            .post(&self.endpoint)
            .query(&[("key", key)])
            .form(&[("image", image.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json::<UploadPayload>()
            .await?;

        non_empty_url(payload.data.url)
    }

    /// Upload base64-encoded images one by one.
    ///
    /// Each image gets its own result; a failure does not stop the batch.
    pub async fn upload_batch(&self, images: &[String]) -> Vec<Result<String, UploadError>> {
        let mut results = Vec::with_capacity(images.len());
        for (index, encoded) in images.iter().enumerate() {
            let result = match decode_image(encoded) {
                Ok(bytes) => self.upload(&bytes).await,
                Err(e) => Err(e),
            };
            match &result {
                Ok(url) => info!(index, url = %url, "Uploaded image"),
                Err(e) => warn!(index, "Image upload failed: {}", e),
            }
            results.push(result);
        }
        results
    }
}

/// Decode a base64 image, accepting an optional `data:...;base64,` prefix.
pub fn decode_image(encoded: &str) -> Result<Vec<u8>, UploadError> {
    let raw = match encoded.split_once(";base64,") {
        Some((_, data)) => data,
        None => encoded,
    };
    let bytes = STANDARD.decode(raw.trim())?;
    if bytes.is_empty() {
        return Err(UploadError::EmptyImage);
    }
    Ok(bytes)
}

fn non_empty_url(url: String) -> Result<String, UploadError> {
    if url.trim().is_empty() {
        Err(UploadError::EmptyUrl)
    } else {
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_image_plain_and_data_url() {
        assert_eq!(decode_image("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(
            decode_image("data:image/png;base64,aGVsbG8=").unwrap(),
            b"hello"
        );
    }

    #[test]
    fn test_decode_image_errors() {
        assert!(matches!(decode_image("%%%"), Err(UploadError::InvalidEncoding(_))));
        assert!(matches!(decode_image(""), Err(UploadError::EmptyImage)));
    }

    #[test]
    fn test_non_empty_url() {
        assert!(matches!(non_empty_url("  ".to_string()), Err(UploadError::EmptyUrl)));
        assert_eq!(
            non_empty_url("https://i.ibb.co/x/beach.jpg".to_string()).unwrap(),
            "https://i.ibb.co/x/beach.jpg"
        );
    }

    #[test]
    fn test_upload_payload_shape() {
        let payload: UploadPayload = serde_json::from_str(
            r#"{"data":{"id":"x","url":"https://i.ibb.co/x/beach.jpg"},"success":true,"status":200}"#,
        )
        .unwrap();
        assert_eq!(payload.data.url, "https://i.ibb.co/x/beach.jpg");
    }

    #[tokio::test]
    async fn test_batch_reports_each_file() {
        let uploader = ImageUploader::new(reqwest::Client::new(), "http://127.0.0.1:9", None);
        let images = vec!["aGVsbG8=".to_string(), "%%%".to_string()];

        let results = uploader.upload_batch(&images).await;
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Err(UploadError::NotConfigured)));
        assert!(matches!(results[1], Err(UploadError::InvalidEncoding(_))));
    }
}
