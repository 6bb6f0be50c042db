use std::path::Path;

use image::{DynamicImage, ImageFormat};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Please select an image file (PNG, JPG, GIF); got {mime}")]
    InvalidInput { mime: String },

    #[error("Error loading image: {0}")]
    DecodeFailure(String),

    #[error("Error reading file: {0}")]
    Read(#[from] std::io::Error),
}

pub fn mime_from_path(path: &Path) -> String {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string())
}

/// Decodes `bytes` after checking that `mime` names an image type.
pub fn decode(bytes: &[u8], mime: &str) -> Result<DynamicImage, LoadError> {
    if !mime.starts_with("image/") {
        return Err(LoadError::InvalidInput {
            mime: mime.to_string(),
        });
    }
    let image =
        image::load_from_memory(bytes).map_err(|e| LoadError::DecodeFailure(e.to_string()))?;
    log::info!(
        "Decoded {} image {}x{} ({} bytes)",
        mime,
        image.width(),
        image.height(),
        bytes.len()
    );
    Ok(image)
}

pub fn open(path: &Path) -> Result<DynamicImage, LoadError> {
    let mime = mime_from_path(path);
    if !mime.starts_with("image/") {
        return Err(LoadError::InvalidInput { mime });
    }
    let bytes = std::fs::read(path)?;
    decode(&bytes, &mime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        RgbaImage::new(3, 2)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decodes_png() {
        let img = decode(&png_bytes(), "image/png").unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
    }

    #[test]
    fn non_image_mime_is_rejected_before_decoding() {
        assert!(matches!(
            decode(&png_bytes(), "text/plain"),
            Err(LoadError::InvalidInput { .. })
        ));
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            decode(b"definitely not an image", "image/png"),
            Err(LoadError::DecodeFailure(_))
        ));
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_from_path(Path::new("a/photo.JPG")), "image/jpeg");
        assert_eq!(mime_from_path(Path::new("cat.gif")), "image/gif");
        assert_eq!(mime_from_path(Path::new("notes.txt")), "application/octet-stream");
    }
}
