pub mod analyze;
pub mod health;
pub mod model;
pub mod terminal;
