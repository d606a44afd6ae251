use crate::error::{AppError, ErrorKind};
use serde::{Deserialize, Serialize};

/// Body of `POST /predict` as the backend sends it.
#[derive(Debug, Deserialize, Clone)]
pub struct PredictResponse {
    #[serde(default)]
    pub class_name: Option<String>,
    pub confidence: f64,
    /// Sent by the backend but never trusted; recomputed from `confidence`.
    #[serde(default)]
    pub confidence_percent: Option<f64>,
    pub status: String,
    pub color: String,
    pub emoji: String,
    pub message: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub num_detections: Option<u32>,
    pub processing_time: f64,
}

/// Outcome of one classification. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    class_name: Option<String>,
    confidence: f64,
    status: String,
    color: String,
    emoji: String,
    message: String,
    priority: Option<String>,
    num_detections: u32,
    processing_time: f64,
}

impl TryFrom<PredictResponse> for AnalysisResult {
    type Error = AppError;

    fn try_from(body: PredictResponse) -> Result<Self, AppError> {
        if !body.confidence.is_finite() || !(0.0..=1.0).contains(&body.confidence) {
            return Err(AppError::new(
                ErrorKind::MalformedResponse,
                format!("Confidence out of range: {}", body.confidence),
            ));
        }
        if !body.processing_time.is_finite() || body.processing_time < 0.0 {
            return Err(AppError::new(
                ErrorKind::MalformedResponse,
                format!("Invalid processing time: {}", body.processing_time),
            ));
        }

        let result = AnalysisResult {
            class_name: body.class_name,
            confidence: body.confidence,
            status: body.status,
            color: body.color,
            emoji: body.emoji,
            message: body.message,
            priority: body.priority,
            num_detections: body.num_detections.unwrap_or(0),
            processing_time: body.processing_time,
        };

        if let Some(sent) = body.confidence_percent {
            if (sent - result.confidence_percent()).abs() > 0.05 {
                tracing::debug!(
                    sent,
                    computed = result.confidence_percent(),
                    "backend confidence_percent disagrees with confidence"
                );
            }
        }

        Ok(result)
    }
}

impl AnalysisResult {
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Confidence × 100, rounded to one decimal.
    pub fn confidence_percent(&self) -> f64 {
        round_to(self.confidence * 100.0, 1)
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn emoji(&self) -> &str {
        &self.emoji
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn priority(&self) -> Option<&str> {
        self.priority.as_deref()
    }

    pub fn num_detections(&self) -> u32 {
        self.num_detections
    }

    pub fn processing_time(&self) -> f64 {
        self.processing_time
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_status(&self.status)
    }
}

/// Bin fill level as reported by the status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Verdict {
    Full,
    Empty,
    NoDetection,
    Unknown,
}

impl Verdict {
    pub fn from_status(status: &str) -> Self {
        let status = status.to_lowercase();
        if status.contains("aucune") || status.contains("no_detection") || status.contains("no detection") {
            Verdict::NoDetection
        } else if status.contains("plein") || status.contains("full") {
            Verdict::Full
        } else if status.contains("vide") || status.contains("empty") {
            Verdict::Empty
        } else {
            Verdict::Unknown
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServiceStatus {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub model_path: Option<String>,
    #[serde(default)]
    pub timestamp: Option<f64>,
}

/// Body of `GET /model-info`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelInfo {
    pub model_type: String,
    #[serde(default)]
    pub model_path: Option<String>,
    #[serde(default)]
    pub class_list: Vec<String>,
    #[serde(default)]
    pub num_classes: usize,
    #[serde(default)]
    pub input_size: Option<u32>,
    #[serde(default)]
    pub framework: Option<String>,
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
