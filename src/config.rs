use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

pub const DEFAULT_MAX_DISPLAY: f32 = 320.0;
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 15;
const DEFAULT_UPLOAD_PRESET: &str = "unsigned";

/// Crop a photo to a rectangle or circle, then download or share it.
#[derive(Debug, Parser)]
#[command(name = "kroppit", version)]
pub struct Cli {
    /// Image to open on startup.
    pub image: Option<PathBuf>,

    /// Width of the box the photo is scaled down to fit, in points.
    #[arg(long, default_value_t = DEFAULT_MAX_DISPLAY)]
    pub max_width: f32,

    /// Height of the box the photo is scaled down to fit, in points.
    #[arg(long, default_value_t = DEFAULT_MAX_DISPLAY)]
    pub max_height: f32,

    /// Hide the dimmed overlay while the selection is being moved.
    #[arg(long)]
    pub hide_overlay_while_dragging: bool,

    /// Give up on an upload after this many seconds.
    #[arg(long, default_value_t = DEFAULT_UPLOAD_TIMEOUT_SECS)]
    pub upload_timeout_secs: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OverlayPolicy {
    #[default]
    Always,
    HideWhileDragging,
}

#[derive(Clone, Debug)]
pub struct EditorConfig {
    pub max_display_width: f32,
    pub max_display_height: f32,
    pub overlay: OverlayPolicy,
    pub upload_timeout: Duration,
    pub initial_image: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_display_width: DEFAULT_MAX_DISPLAY,
            max_display_height: DEFAULT_MAX_DISPLAY,
            overlay: OverlayPolicy::Always,
            upload_timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
            initial_image: None,
        }
    }
}

impl From<Cli> for EditorConfig {
    fn from(cli: Cli) -> Self {
        let positive = |v: f32| if v.is_finite() && v > 0.0 { v } else { DEFAULT_MAX_DISPLAY };
        Self {
            max_display_width: positive(cli.max_width),
            max_display_height: positive(cli.max_height),
            overlay: if cli.hide_overlay_while_dragging {
                OverlayPolicy::HideWhileDragging
            } else {
                OverlayPolicy::Always
            },
            upload_timeout: Duration::from_secs(cli.upload_timeout_secs.max(1)),
            initial_image: cli.image,
        }
    }
}

/// Unsigned-upload settings for the Cloudinary image host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
}

impl CloudinaryConfig {
    /// Reads `CLOUDINARY_CLOUD_NAME` and `CLOUDINARY_UPLOAD_PRESET`, after
    /// loading a `.env` file if one exists. `None` when no cloud is named.
    pub fn from_env() -> Option<Self> {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("No .env loaded: {}", e);
        }
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let cloud_name = get("CLOUDINARY_CLOUD_NAME").filter(|s| !s.trim().is_empty())?;
        let upload_preset = get("CLOUDINARY_UPLOAD_PRESET")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_UPLOAD_PRESET.to_string());
        Some(Self {
            cloud_name,
            upload_preset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let config = EditorConfig::from(Cli::parse_from(["kroppit"]));
        assert_eq!(config.max_display_width, 320.0);
        assert_eq!(config.max_display_height, 320.0);
        assert_eq!(config.overlay, OverlayPolicy::Always);
        assert_eq!(config.upload_timeout, Duration::from_secs(15));
        assert!(config.initial_image.is_none());
    }

    #[test]
    fn cli_flags() {
        let config = EditorConfig::from(Cli::parse_from([
            "kroppit",
            "photo.png",
            "--max-width",
            "640",
            "--hide-overlay-while-dragging",
            "--upload-timeout-secs",
            "0",
        ]));
        assert_eq!(config.max_display_width, 640.0);
        assert_eq!(config.overlay, OverlayPolicy::HideWhileDragging);
        assert_eq!(config.upload_timeout, Duration::from_secs(1));
        assert_eq!(config.initial_image, Some(PathBuf::from("photo.png")));
    }

    #[test]
    fn cloudinary_needs_a_cloud_name() {
        assert_eq!(CloudinaryConfig::from_vars(|_| None), None);

        let config = CloudinaryConfig::from_vars(|key| match key {
            "CLOUDINARY_CLOUD_NAME" => Some("demo".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.upload_preset, "unsigned");
    }
}
