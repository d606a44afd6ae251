use crate::error::AppError;
use crate::models::analysis_types::AnalysisResult;
use serde::Serialize;
use std::sync::Arc;

/// Decoded thumbnail of the selected image, ready to embed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    pub data_uri: String,
}

/// The user's chosen image. Cheap to clone; the bytes are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub byte_size: u64,
    pub content: Arc<[u8]>,
    /// State version at which this file entered `Previewing`.
    pub selection: u64,
    pub preview: Option<PreviewImage>,
}

impl SelectedFile {
    pub fn from_bytes(name: impl Into<String>, media_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            byte_size: content.len() as u64,
            content: Arc::from(content),
            selection: 0,
            preview: None,
        }
    }

    /// Declared size differing from the payload, as a browser `File` may report.
    pub fn with_declared_size(mut self, byte_size: u64) -> Self {
        self.byte_size = byte_size;
        self
    }
}

/// Where an error banner goes back to once dismissed.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnState {
    Idle,
    Previewing(SelectedFile),
}

impl From<ReturnState> for WorkflowState {
    fn from(value: ReturnState) -> Self {
        match value {
            ReturnState::Idle => WorkflowState::Idle,
            ReturnState::Previewing(file) => WorkflowState::Previewing(file),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    Previewing(SelectedFile),
    /// `ticket` is the state version that issued the request.
    Analyzing { file: SelectedFile, ticket: u64 },
    Result(AnalysisResult),
    Error { error: AppError, return_to: ReturnState },
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Previewing(_) => "previewing",
            WorkflowState::Analyzing { .. } => "analyzing",
            WorkflowState::Result(_) => "result",
            WorkflowState::Error { .. } => "error",
        }
    }

    /// The staged file, including one waiting behind an error banner.
    pub fn selected_file(&self) -> Option<&SelectedFile> {
        match self {
            WorkflowState::Previewing(file) | WorkflowState::Analyzing { file, .. } => Some(file),
            WorkflowState::Error {
                return_to: ReturnState::Previewing(file),
                ..
            } => Some(file),
            _ => None,
        }
    }

    /// Where an error raised from this state should return to.
    /// `None` while analyzing: no error is raised over an in-flight request.
    pub fn return_point(&self) -> Option<ReturnState> {
        match self {
            WorkflowState::Idle | WorkflowState::Result(_) => Some(ReturnState::Idle),
            WorkflowState::Previewing(file) => Some(ReturnState::Previewing(file.clone())),
            WorkflowState::Error { return_to, .. } => Some(return_to.clone()),
            WorkflowState::Analyzing { .. } => None,
        }
    }
}
