//! Client-side workflow for a waste-bin classification service: validate a
//! photo, send it for analysis, present the verdict and keep running
//! statistics for the session.

pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::ClientConfig;
pub use error::{AppError, ErrorKind};
pub use services::api_client::{ApiClient, HttpApiClient};
pub use services::workflow::{Command, Renderer, Session, WorkflowController};
