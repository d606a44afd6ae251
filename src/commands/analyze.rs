use crate::error::AppError;
use crate::models::workflow_types::{SelectedFile, WorkflowState};
use crate::services::api_client::ApiClient;
use crate::services::preview_service;
use crate::services::workflow::{Renderer, WorkflowController};
use std::path::Path;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AnalyzeSummary {
    pub analyzed: usize,
    pub rejected: usize,
    pub failed: usize,
}

/// Read a file from disk the way a browser hands it over: name, declared
/// media type and bytes.
pub async fn load_selected_file(path: &Path) -> Result<SelectedFile, AppError> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::from(e).context(&format!("Cannot read {}", path.display())))?;
    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    Ok(SelectedFile::from_bytes(
        name,
        preview_service::guess_media_type(path),
        content,
    ))
}

/// Push every file through select → analyze → result, one at a time.
pub async fn analyze_files<C, R, P>(
    controller: &mut WorkflowController<C, R>,
    paths: &[P],
) -> Result<AnalyzeSummary, AppError>
where
    C: ApiClient + 'static,
    R: Renderer,
    P: AsRef<Path>,
{
    let mut summary = AnalyzeSummary::default();

    for path in paths {
        let file = load_selected_file(path.as_ref()).await?;
        controller.select_file(file);

        if !matches!(controller.state(), WorkflowState::Previewing(_)) {
            summary.rejected += 1;
            continue;
        }

        controller.analyze();
        controller.finish_analysis().await;

        match controller.state() {
            WorkflowState::Result(_) => summary.analyzed += 1,
            _ => summary.failed += 1,
        }
    }

    Ok(summary)
}
