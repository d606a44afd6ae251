pub mod api_client;
pub mod file_validator;
pub mod model_download;
pub mod presenter;
pub mod preview_service;
pub mod stats_aggregator;
pub mod workflow;
