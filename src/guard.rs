/// Encoded images must stay strictly under this many bytes.
pub const MAX_BYTES: usize = 10 * 1024 * 1024;

pub const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/gif"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GuardError {
    #[error(
        "Image too large for Farcaster ({:.2} MB); images must be under {} MB",
        *size as f64 / (1024.0 * 1024.0),
        limit / (1024 * 1024)
    )]
    TooLarge { size: usize, limit: usize },

    #[error("Unsupported image format: {mime}; only JPG, PNG and GIF are allowed")]
    UnsupportedFormat { mime: String },
}

pub fn validate(bytes: &[u8], mime: &str) -> Result<(), GuardError> {
    if bytes.len() >= MAX_BYTES {
        return Err(GuardError::TooLarge {
            size: bytes.len(),
            limit: MAX_BYTES,
        });
    }

    let mime = mime.trim().to_ascii_lowercase();
    if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
        return Err(GuardError::UnsupportedFormat { mime });
    }

    log::debug!("Share check passed: {} bytes, {}", bytes.len(), mime);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_png_passes() {
        assert_eq!(validate(&[0u8; 1024], "image/png"), Ok(()));
        assert_eq!(validate(&[], "IMAGE/JPEG"), Ok(()));
    }

    #[test]
    fn limit_is_exclusive() {
        let at_limit = vec![0u8; MAX_BYTES];
        assert!(matches!(
            validate(&at_limit, "image/png"),
            Err(GuardError::TooLarge { size, .. }) if size == MAX_BYTES
        ));
        assert_eq!(validate(&at_limit[1..], "image/png"), Ok(()));
    }

    #[test]
    fn svg_is_rejected() {
        assert_eq!(
            validate(&[0u8; 8], "image/svg+xml"),
            Err(GuardError::UnsupportedFormat {
                mime: "image/svg+xml".into()
            })
        );
    }

    #[test]
    fn size_is_reported_in_megabytes() {
        let err = GuardError::TooLarge {
            size: 12 * 1024 * 1024,
            limit: MAX_BYTES,
        };
        assert!(err.to_string().contains("12.00 MB"));
    }
}
