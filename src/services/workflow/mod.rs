pub mod controller;
pub mod machine;

pub use controller::{Command, Renderer, Session, WorkflowController};
pub use machine::{Effect, Event, Outcome};
