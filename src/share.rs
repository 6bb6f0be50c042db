use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use serde::Deserialize;

use crate::config::CloudinaryConfig;

pub const SHARE_CAPTION: &str =
    "Just kropped a perfect photo! 📸 Try Kroppit - the easiest photo crop tool for Farcaster:";

pub const COMPOSE_URL: &str = "https://warpcast.com/~/compose";

const UPLOAD_FOLDER: &str = "kroppit";

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("Could not upload image: {0}")]
    HostUploadFailure(String),

    #[error("Could not open the cast composer: {0}")]
    ComposerFailure(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComposeOutcome {
    Success,
    Cancelled,
}

/// Stores image bytes somewhere public. Retrying with the same bytes must be
/// safe; callers do not retry on their own.
pub trait ImageHost: Send + Sync {
    fn upload(&self, bytes: &[u8], mime: &str) -> Result<String, ShareError>;
}

pub trait ShareComposer {
    fn compose(&self, text: &str, image_urls: &[String]) -> Result<ComposeOutcome, ShareError>;
}

pub fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

pub struct CloudinaryHost {
    config: Option<CloudinaryConfig>,
    client: reqwest::blocking::Client,
}

impl CloudinaryHost {
    pub fn new(config: Option<CloudinaryConfig>, timeout: Duration) -> Result<Self, ShareError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ShareError::HostUploadFailure(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn endpoint(config: &CloudinaryConfig) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            config.cloud_name
        )
    }
}

impl ImageHost for CloudinaryHost {
    fn upload(&self, bytes: &[u8], mime: &str) -> Result<String, ShareError> {
        let config = self.config.as_ref().ok_or_else(|| {
            ShareError::HostUploadFailure(
                "Cloudinary not configured - set CLOUDINARY_CLOUD_NAME".to_string(),
            )
        })?;

        let data_uri = format!(
            "data:{};base64,{}",
            mime,
            base64::engine::general_purpose::STANDARD.encode(bytes)
        );
        let public_id = format!("{}/cropped_image_{}", UPLOAD_FOLDER, unix_millis());
        log::info!("Uploading {} bytes to Cloudinary as {}", bytes.len(), public_id);

        let params = [
            ("file", data_uri),
            ("upload_preset", config.upload_preset.clone()),
            ("public_id", public_id),
            ("folder", UPLOAD_FOLDER.to_string()),
        ];
        let response = self
            .client
            .post(Self::endpoint(config))
            .form(&params)
            .send()
            .map_err(|e| ShareError::HostUploadFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShareError::HostUploadFailure(format!(
                "Cloudinary upload failed: {}",
                status
            )));
        }

        let body: UploadResponse = response
            .json()
            .map_err(|e| ShareError::HostUploadFailure(e.to_string()))?;
        log::info!("Cloudinary upload successful: {}", body.secure_url);
        Ok(body.secure_url)
    }
}

/// Warpcast compose intent URL for `text` with `image_urls` embedded.
pub fn compose_url(text: &str, image_urls: &[String]) -> Result<reqwest::Url, ShareError> {
    let mut params = vec![("text", text)];
    params.extend(image_urls.iter().map(|url| ("embeds[]", url.as_str())));
    reqwest::Url::parse_with_params(COMPOSE_URL, &params)
        .map_err(|e| ShareError::ComposerFailure(e.to_string()))
}

pub struct WarpcastComposer {
    open: Box<dyn Fn(&str) + Send + Sync>,
}

impl WarpcastComposer {
    pub fn new(open: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            open: Box::new(open),
        }
    }
}

impl ShareComposer for WarpcastComposer {
    fn compose(&self, text: &str, image_urls: &[String]) -> Result<ComposeOutcome, ShareError> {
        if image_urls.is_empty() {
            return Err(ShareError::ComposerFailure("no image to embed".to_string()));
        }
        let url = compose_url(text, image_urls)?;
        log::info!("Opening Warpcast composer: {}", url);
        (self.open)(url.as_str());
        Ok(ComposeOutcome::Success)
    }
}

/// Runs `host.upload` off the UI thread. The receiver yields exactly one result.
pub fn spawn_upload(
    host: Arc<dyn ImageHost>,
    bytes: Vec<u8>,
    mime: &'static str,
) -> Receiver<Result<String, ShareError>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = host.upload(&bytes, mime);
        if let Err(e) = &result {
            log::warn!("Upload failed: {}", e);
        }
        let _ = tx.send(result);
    });
    rx
}
