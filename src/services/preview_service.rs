use crate::error::AppError;
use crate::models::workflow_types::PreviewImage;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

const PREVIEW_SIZE: u32 = 480;
const PREVIEW_QUALITY: u8 = 75;

/// Decode an uploaded image and return a JPEG preview as a base64 data URI.
/// Dimensions are those of the original image.
pub fn decode_preview(bytes: &[u8]) -> Result<PreviewImage, AppError> {
    let start = Instant::now();

    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()
        .map_err(|e| AppError::from(e).context("Failed to decode preview"))?;
    let (width, height) = (img.width(), img.height());

    let small = if width > PREVIEW_SIZE || height > PREVIEW_SIZE {
        img.resize(PREVIEW_SIZE, PREVIEW_SIZE, FilterType::Triangle)
    } else {
        img
    };

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, PREVIEW_QUALITY);
    // JPEG has no alpha channel.
    image::DynamicImage::ImageRgb8(small.to_rgb8()).write_with_encoder(encoder)?;

    let b64 = base64::engine::general_purpose::STANDARD.encode(buffer.into_inner());
    tracing::debug!(
        width,
        height,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "preview decoded"
    );

    Ok(PreviewImage {
        width,
        height,
        data_uri: format!("data:image/jpeg;base64,{}", b64),
    })
}

/// Media type a browser would declare for this file, from its extension.
pub fn guess_media_type(path: &Path) -> String {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string())
}
