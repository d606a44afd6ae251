use crate::config::ClientConfig;
use crate::error::{AppError, ErrorKind};
use crate::models::analysis_types::{AnalysisResult, ModelInfo, PredictResponse, ServiceStatus};
use crate::models::workflow_types::SelectedFile;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use std::future::Future;

/// Name under which the backend expects the uploaded image.
const UPLOAD_FIELD: &str = "file";

/// The classification backend as the workflow sees it.
pub trait ApiClient {
    fn health(&self) -> impl Future<Output = Result<ServiceStatus, AppError>>;

    fn predict(&self, file: &SelectedFile) -> impl Future<Output = Result<AnalysisResult, AppError>>;

    fn download_model(&self) -> impl Future<Output = Result<Vec<u8>, AppError>>;
}

#[derive(Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &Url {
        &self.config.api_url
    }

    pub async fn model_info(&self) -> Result<ModelInfo, AppError> {
        let response = self.get("model-info").await?;
        response.json().await.map_err(network_error)
    }

    async fn get(&self, path: &str) -> Result<Response, AppError> {
        let url = self.config.endpoint(path)?;
        let response = self.client.get(url).send().await.map_err(network_error)?;
        ensure_success(response)
    }
}

impl ApiClient for HttpApiClient {
    async fn health(&self) -> Result<ServiceStatus, AppError> {
        let response = self.get("health").await?;
        let status: ServiceStatus = response.json().await.map_err(network_error)?;
        tracing::info!(status = %status.status, model_loaded = status.model_loaded, "API connected");
        Ok(status)
    }

    async fn predict(&self, file: &SelectedFile) -> Result<AnalysisResult, AppError> {
        let url = self.config.endpoint("predict")?;
        let part = Part::bytes(file.content.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.media_type)
            .map_err(|e| AppError::new(ErrorKind::Other, format!("Invalid media type: {}", e)))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        tracing::info!(file = %file.name, bytes = file.byte_size, "uploading for analysis");
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(network_error)?;
        let response = ensure_success(response)?;
        let body = response.bytes().await.map_err(network_error)?;

        decode_predict_body(&body)
    }

    async fn download_model(&self) -> Result<Vec<u8>, AppError> {
        let response = self.get("download-model").await?;

        // Only used for progress; the header is not trusted for allocation.
        let total_size = response.content_length().unwrap_or(0);
        let mut blob = Vec::new();
        let mut stream = response.bytes_stream();
        let mut last_logged = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(network_error)?;
            blob.extend_from_slice(&chunk);

            if total_size > 0 {
                let progress = (blob.len() as u64 * 100) / total_size;
                // Every 10% is plenty for a log line.
                if progress >= last_logged + 10 {
                    tracing::debug!(progress, "model download progress");
                    last_logged = progress;
                }
            }
        }

        tracing::info!(bytes = blob.len(), "model downloaded");
        Ok(blob)
    }
}

/// Parse a `/predict` body into a result.
pub fn decode_predict_body(body: &[u8]) -> Result<AnalysisResult, AppError> {
    let parsed: PredictResponse = serde_json::from_slice(body)?;
    AnalysisResult::try_from(parsed)
}

fn ensure_success(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::new(
            ErrorKind::Http(status.as_u16()),
            format!(
                "error {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ),
        ));
    }
    Ok(response)
}

/// Transport failures never carry a status; keep them out of `Http`.
fn network_error(err: reqwest::Error) -> AppError {
    let kind = if err.is_decode() {
        ErrorKind::MalformedResponse
    } else {
        ErrorKind::Network
    };
    AppError::new(kind, err.to_string())
}
