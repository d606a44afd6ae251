use crate::error::AppError;

/// Largest upload accepted locally (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotAnImage,
    TooLarge,
}

impl From<Rejection> for AppError {
    fn from(reason: Rejection) -> Self {
        match reason {
            Rejection::NotAnImage => AppError::not_an_image(),
            Rejection::TooLarge => AppError::too_large(),
        }
    }
}

/// Check a candidate upload. The type check wins when both would fail.
pub fn validate(media_type: &str, byte_size: u64) -> Result<(), Rejection> {
    if !media_type.starts_with("image/") {
        return Err(Rejection::NotAnImage);
    }
    if byte_size > MAX_UPLOAD_BYTES {
        return Err(Rejection::TooLarge);
    }
    Ok(())
}
