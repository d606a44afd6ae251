use crate::models::analysis_types::Verdict;
use crate::models::workflow_types::PreviewImage;
use serde::Serialize;

/// Everything a renderer needs for one frame. No further logic required.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub screen: Screen,
    /// Absent until the first analysis has completed.
    pub stats: Option<StatsView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    DropZone,
    Preview {
        file_name: String,
        media_type: String,
        byte_size: u64,
        preview: Option<PreviewImage>,
    },
    Loading {
        file_name: String,
    },
    Result(ResultView),
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub emoji: String,
    pub status: String,
    pub color: String,
    /// `color` with a low alpha suffix, for the header background.
    pub header_tint: String,
    pub confidence_percent: f64,
    pub confidence_label: String,
    pub message: String,
    pub class_name: String,
    pub priority: String,
    pub num_detections: u32,
    pub processing_time_label: String,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsView {
    pub total_analyses: u64,
    pub mean_confidence_percent: f64,
    pub mean_processing_time: f64,
    pub avg_confidence_label: String,
    pub avg_time_label: String,
    pub full_share_label: String,
    pub recent: Vec<HistoryRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub emoji: String,
    pub status: String,
    pub confidence_label: String,
}
