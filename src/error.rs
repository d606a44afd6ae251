use serde::Serialize;
use std::fmt;

/// Failure categories a renderer can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "status")]
pub enum ErrorKind {
    NotAnImage,
    TooLarge,
    NoFileSelected,
    Network,
    Http(u16),
    MalformedResponse,
    Io,
    Decode,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        AppError {
            kind,
            message: message.into(),
        }
    }

    pub fn not_an_image() -> Self {
        Self::new(
            ErrorKind::NotAnImage,
            "Please select a valid image (JPG, PNG, JPEG)",
        )
    }

    pub fn too_large() -> Self {
        Self::new(ErrorKind::TooLarge, "The image is too large. Maximum size: 10 MB")
    }

    pub fn no_file_selected() -> Self {
        Self::new(ErrorKind::NoFileSelected, "No image selected")
    }

    pub fn unreachable() -> Self {
        Self::new(
            ErrorKind::Network,
            "Unable to reach the server. Check that the backend is running.",
        )
    }

    /// Prefix the message, keeping the kind.
    pub fn context(self, context: &str) -> Self {
        AppError {
            kind: self.kind,
            message: format!("{}: {}", context, self.message),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::new(ErrorKind::Io, err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::new(ErrorKind::Decode, err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if let Some(status) = err.status() {
            ErrorKind::Http(status.as_u16())
        } else if err.is_decode() {
            ErrorKind::MalformedResponse
        } else {
            ErrorKind::Network
        };
        AppError::new(kind, err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::new(
            ErrorKind::MalformedResponse,
            format!("Unexpected response body: {}", err),
        )
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::new(ErrorKind::Other, msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::new(ErrorKind::Other, msg)
    }
}
