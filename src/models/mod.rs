pub mod analysis_types;
pub mod view_types;
pub mod workflow_types;
