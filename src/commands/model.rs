use crate::config::ClientConfig;
use crate::error::AppError;
use crate::models::analysis_types::ModelInfo;
use crate::services::api_client::ApiClient;
use crate::services::model_download::ModelDownloader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub async fn download_model<C: ApiClient>(
    client: Arc<C>,
    config: &ClientConfig,
    output_dir: &Path,
) -> Result<PathBuf, AppError> {
    let downloader = ModelDownloader::new(client, config.download_reset_delay);
    tracing::info!(label = downloader.status().await.label(), "starting model download");
    let path = downloader.download_to(output_dir).await?;
    tracing::info!(label = downloader.status().await.label(), path = %path.display());
    Ok(path)
}

pub fn format_model_info(info: &ModelInfo) -> String {
    let mut out = format!("Model: {}", info.model_type);
    if let Some(framework) = &info.framework {
        out.push_str(&format!(" ({})", framework));
    }
    if let Some(size) = info.input_size {
        out.push_str(&format!(", input {}px", size));
    }
    out.push_str(&format!("\nClasses ({}): {}", info.num_classes, info.class_list.join(", ")));
    out
}
