use crate::error::AppError;
use crate::services::api_client::ApiClient;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// File name the model is saved under.
pub const MODEL_FILE_NAME: &str = "best.pt";

/// State of the download button.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DownloadStatus {
    Idle,
    InProgress,
    Done { path: String },
    Failed { message: String },
}

impl DownloadStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DownloadStatus::Idle => "📥 Download model",
            DownloadStatus::InProgress => "⏳ Downloading...",
            DownloadStatus::Done { .. } => "✅ Downloaded!",
            DownloadStatus::Failed { .. } => "❌ Error",
        }
    }
}

pub struct ModelDownloader<C> {
    client: Arc<C>,
    status: Arc<Mutex<DownloadStatus>>,
    reset_delay: Duration,
    /// Bumped on every download so a stale reset leaves a newer outcome alone.
    generation: Arc<Mutex<u64>>,
}

impl<C: ApiClient> ModelDownloader<C> {
    pub fn new(client: Arc<C>, reset_delay: Duration) -> Self {
        Self {
            client,
            status: Arc::new(Mutex::new(DownloadStatus::Idle)),
            reset_delay,
            generation: Arc::new(Mutex::new(0)),
        }
    }

    pub async fn status(&self) -> DownloadStatus {
        self.status.lock().await.clone()
    }

    /// Fetch the model and write it to `<dest_dir>/best.pt`.
    pub async fn download_to(&self, dest_dir: &Path) -> Result<PathBuf, AppError> {
        {
            let mut status = self.status.lock().await;
            if *status == DownloadStatus::InProgress {
                return Err("Model download already in progress".into());
            }
            *status = DownloadStatus::InProgress;
        }
        let generation = {
            let mut generation = self.generation.lock().await;
            *generation += 1;
            *generation
        };

        let result = self.fetch_and_save(dest_dir).await;

        *self.status.lock().await = match &result {
            Ok(path) => DownloadStatus::Done {
                path: path.display().to_string(),
            },
            Err(e) => {
                tracing::warn!(error = %e, "model download failed");
                DownloadStatus::Failed {
                    message: e.message.clone(),
                }
            }
        };
        self.schedule_reset(generation);

        result
    }

    async fn fetch_and_save(&self, dest_dir: &Path) -> Result<PathBuf, AppError> {
        let blob = self.client.download_model().await?;

        tokio::fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| AppError::from(e).context("Failed to create output directory"))?;
        let dest = dest_dir.join(MODEL_FILE_NAME);
        tokio::fs::write(&dest, &blob)
            .await
            .map_err(|e| AppError::from(e).context(&format!("Failed to write {}", dest.display())))?;

        tracing::info!(path = %dest.display(), bytes = blob.len(), "model saved");
        Ok(dest)
    }

    fn schedule_reset(&self, generation: u64) {
        let status = Arc::clone(&self.status);
        let current = Arc::clone(&self.generation);
        let delay = self.reset_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if *current.lock().await == generation {
                *status.lock().await = DownloadStatus::Idle;
            }
        });
    }
}
