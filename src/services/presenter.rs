use crate::models::analysis_types::AnalysisResult;
use crate::models::view_types::{HistoryRow, ResultView, Screen, StatsView, ViewModel};
use crate::models::workflow_types::WorkflowState;
use crate::services::stats_aggregator::{StatsAggregator, StatsSnapshot};

const MISSING: &str = "N/A";

pub fn present(state: &WorkflowState, stats: &StatsAggregator) -> ViewModel {
    ViewModel {
        screen: present_screen(state),
        stats: stats.snapshot().as_ref().map(present_stats),
    }
}

pub fn present_screen(state: &WorkflowState) -> Screen {
    match state {
        WorkflowState::Idle => Screen::DropZone,
        WorkflowState::Previewing(file) => Screen::Preview {
            file_name: file.name.clone(),
            media_type: file.media_type.clone(),
            byte_size: file.byte_size,
            preview: file.preview.clone(),
        },
        WorkflowState::Analyzing { file, .. } => Screen::Loading {
            file_name: file.name.clone(),
        },
        WorkflowState::Result(result) => Screen::Result(present_result(result)),
        WorkflowState::Error { error, .. } => Screen::Error {
            message: error.message.clone(),
        },
    }
}

pub fn present_result(result: &AnalysisResult) -> ResultView {
    ResultView {
        emoji: result.emoji().to_string(),
        status: result.status().to_string(),
        color: result.color().to_string(),
        header_tint: format!("{}20", result.color()),
        confidence_percent: result.confidence_percent(),
        confidence_label: percent_label(result.confidence_percent()),
        message: result.message().to_string(),
        class_name: result.class_name().unwrap_or(MISSING).to_string(),
        priority: result.priority().unwrap_or(MISSING).to_string(),
        num_detections: result.num_detections(),
        processing_time_label: format!("{}s", result.processing_time()),
        verdict: result.verdict(),
    }
}

pub fn present_stats(snapshot: &StatsSnapshot) -> StatsView {
    StatsView {
        total_analyses: snapshot.count,
        mean_confidence_percent: snapshot.mean_confidence_percent,
        mean_processing_time: snapshot.mean_processing_time,
        avg_confidence_label: percent_label(snapshot.mean_confidence_percent),
        avg_time_label: format!("{:.2}s", snapshot.mean_processing_time),
        full_share_label: format!("{:.0}%", snapshot.full_share_percent),
        recent: snapshot
            .recent
            .iter()
            .map(|r| HistoryRow {
                emoji: r.emoji().to_string(),
                status: r.status().to_string(),
                confidence_label: percent_label(r.confidence_percent()),
            })
            .collect(),
    }
}

fn percent_label(value: f64) -> String {
    format!("{:.1}%", value)
}
