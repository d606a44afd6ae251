//! The analyze/result/error lifecycle as a pure function of
//! `(state, version, event)`.
//!
//! Every accepted event produces a new state at `version + 1`. Work that
//! must happen outside the machine (network calls, timers, decoding,
//! statistics) is returned as [`Effect`]s tagged with that version, and
//! comes back later as an [`Event`] carrying the same tag. A tag that no
//! longer matches the current state means the user has moved on and the
//! event is dropped.

use crate::error::AppError;
use crate::models::analysis_types::{AnalysisResult, ServiceStatus};
use crate::models::workflow_types::{PreviewImage, ReturnState, SelectedFile, WorkflowState};
use crate::services::file_validator;

#[derive(Debug, Clone)]
pub enum Event {
    FileSelected(SelectedFile),
    AnalyzeRequested,
    ResetRequested,
    PreviewDecoded { selection: u64, preview: PreviewImage },
    PredictCompleted {
        ticket: u64,
        outcome: Result<AnalysisResult, AppError>,
    },
    DismissElapsed { version: u64 },
    HealthChecked(Result<ServiceStatus, AppError>),
}

impl Event {
    /// Ticket of a finished analysis, if this is one.
    pub fn completion_ticket(&self) -> Option<u64> {
        match self {
            Event::PredictCompleted { ticket, .. } => Some(*ticket),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    DecodePreview { selection: u64, file: SelectedFile },
    Predict { ticket: u64, file: SelectedFile },
    ScheduleDismiss { version: u64 },
    RecordResult(AnalysisResult),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing changes; no render.
    Ignored,
    /// Same workflow state with fresh details (a decoded preview). The
    /// version is unchanged so pending timers and requests stay valid.
    Refreshed(WorkflowState),
    Transitioned {
        next: WorkflowState,
        effects: Vec<Effect>,
    },
}

pub fn transition(state: &WorkflowState, version: u64, event: Event) -> Outcome {
    let next_version = version + 1;

    match event {
        Event::FileSelected(file) => {
            let Some(return_to) = state.return_point() else {
                return Outcome::Ignored;
            };
            match file_validator::validate(&file.media_type, file.byte_size) {
                Ok(()) => {
                    let file = SelectedFile {
                        selection: next_version,
                        preview: None,
                        ..file
                    };
                    Outcome::Transitioned {
                        next: WorkflowState::Previewing(file.clone()),
                        effects: vec![Effect::DecodePreview {
                            selection: next_version,
                            file,
                        }],
                    }
                }
                Err(reason) => show_error(reason.into(), return_to, next_version),
            }
        }

        Event::AnalyzeRequested => match state {
            WorkflowState::Previewing(file) => Outcome::Transitioned {
                next: WorkflowState::Analyzing {
                    file: file.clone(),
                    ticket: next_version,
                },
                effects: vec![Effect::Predict {
                    ticket: next_version,
                    file: file.clone(),
                }],
            },
            WorkflowState::Idle => {
                show_error(AppError::no_file_selected(), ReturnState::Idle, next_version)
            }
            _ => Outcome::Ignored,
        },

        Event::ResetRequested => Outcome::Transitioned {
            next: WorkflowState::Idle,
            effects: Vec::new(),
        },

        Event::PreviewDecoded { selection, preview } => match state {
            WorkflowState::Previewing(file) if file.selection == selection => {
                Outcome::Refreshed(WorkflowState::Previewing(with_preview(file, preview)))
            }
            WorkflowState::Analyzing { file, ticket } if file.selection == selection => {
                Outcome::Refreshed(WorkflowState::Analyzing {
                    file: with_preview(file, preview),
                    ticket: *ticket,
                })
            }
            WorkflowState::Error {
                error,
                return_to: ReturnState::Previewing(file),
            } if file.selection == selection => Outcome::Refreshed(WorkflowState::Error {
                error: error.clone(),
                return_to: ReturnState::Previewing(with_preview(file, preview)),
            }),
            _ => Outcome::Ignored,
        },

        Event::PredictCompleted { ticket, outcome } => match state {
            WorkflowState::Analyzing {
                file,
                ticket: current,
            } if *current == ticket => match outcome {
                Ok(result) => Outcome::Transitioned {
                    next: WorkflowState::Result(result.clone()),
                    effects: vec![Effect::RecordResult(result)],
                },
                Err(error) => show_error(
                    error.context("Analysis failed"),
                    ReturnState::Previewing(file.clone()),
                    next_version,
                ),
            },
            _ => Outcome::Ignored,
        },

        Event::DismissElapsed { version: scheduled } => match state {
            WorkflowState::Error { return_to, .. } if scheduled == version => Outcome::Transitioned {
                next: return_to.clone().into(),
                effects: Vec::new(),
            },
            _ => Outcome::Ignored,
        },

        Event::HealthChecked(Ok(_)) => Outcome::Ignored,
        Event::HealthChecked(Err(_)) => match state {
            WorkflowState::Error { .. } | WorkflowState::Analyzing { .. } => Outcome::Ignored,
            _ => match state.return_point() {
                Some(return_to) => show_error(AppError::unreachable(), return_to, next_version),
                None => Outcome::Ignored,
            },
        },
    }
}

fn show_error(error: AppError, return_to: ReturnState, next_version: u64) -> Outcome {
    Outcome::Transitioned {
        next: WorkflowState::Error { error, return_to },
        effects: vec![Effect::ScheduleDismiss {
            version: next_version,
        }],
    }
}

fn with_preview(file: &SelectedFile, preview: PreviewImage) -> SelectedFile {
    SelectedFile {
        preview: Some(preview),
        ..file.clone()
    }
}
