use crate::domain::entities::ingest_item::ImageSource;
use crate::domain::error::EngineError;
use image::{DynamicImage, RgbImage};

/// Decode any supported format and normalize to 3-channel RGB8, the form
/// every embedding generator expects.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, EngineError> {
    if bytes.is_empty() {
        return Err(EngineError::InvalidImage("no image data".into()));
    }
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| EngineError::InvalidImage(format!("cannot decode image: {e}")))?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(EngineError::InvalidImage("image has zero width or height".into()));
    }
    Ok(match decoded {
        DynamicImage::ImageRgb8(img) => img,
        img => img.to_rgb8(),
    })
}

pub fn load_rgb(source: &ImageSource) -> Result<RgbImage, EngineError> {
    match source {
        ImageSource::Path(path) => {
            let bytes = std::fs::read(path).map_err(|e| {
                EngineError::InvalidImage(format!("cannot read {}: {e}", path.display()))
            })?;
            decode_rgb(&bytes)
        }
        ImageSource::Bytes(bytes) => decode_rgb(bytes),
    }
}
