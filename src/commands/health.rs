use crate::error::AppError;
use crate::models::analysis_types::ServiceStatus;
use crate::services::api_client::ApiClient;

pub async fn check_health<C: ApiClient>(client: &C) -> Result<ServiceStatus, AppError> {
    client.health().await.map_err(|e| {
        tracing::error!(error = %e, "API connection failed");
        AppError::unreachable()
    })
}

pub fn format_status(status: &ServiceStatus) -> String {
    let model = if status.model_loaded { "loaded" } else { "not loaded" };
    match &status.model_path {
        Some(path) => format!("API {} (model {}: {})", status.status, model, path),
        None => format!("API {} (model {})", status.status, model),
    }
}
