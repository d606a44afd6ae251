use crate::models::view_types::{Screen, StatsView, ViewModel};
use crate::services::workflow::Renderer;
use std::io::Write;

/// Writes each view-model as a few plain text lines.
pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, view: &ViewModel) {
        if let Err(e) = writeln!(self.out, "{}", format_screen(&view.screen)) {
            tracing::warn!(error = %e, "failed to write view");
        }
    }
}

pub fn format_screen(screen: &Screen) -> String {
    match screen {
        Screen::DropZone => "Drop an image to analyze".to_string(),
        Screen::Preview {
            file_name,
            byte_size,
            preview,
            ..
        } => match preview {
            Some(p) => format!("Ready: {} ({} KB, {}x{})", file_name, byte_size / 1024, p.width, p.height),
            None => format!("Ready: {} ({} KB)", file_name, byte_size / 1024),
        },
        Screen::Loading { file_name } => format!("Analyzing {}...", file_name),
        Screen::Result(r) => format!(
            "{} {} | confidence {} | {}\n  class: {} | priority: {} | detections: {} | time: {}",
            r.emoji,
            r.status,
            r.confidence_label,
            r.message,
            r.class_name,
            r.priority,
            r.num_detections,
            r.processing_time_label
        ),
        Screen::Error { message } => format!("Error: {}", message),
    }
}

pub fn format_stats(stats: &StatsView) -> String {
    let mut lines = vec![format!(
        "Analyses: {} | avg confidence: {} | avg time: {} | full: {}",
        stats.total_analyses, stats.avg_confidence_label, stats.avg_time_label, stats.full_share_label
    )];
    for row in &stats.recent {
        lines.push(format!("  {} {} {}", row.emoji, row.status, row.confidence_label));
    }
    lines.join("\n")
}
