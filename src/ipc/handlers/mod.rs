pub mod assessments;
pub mod auth;
pub mod core;
pub mod reports;
pub mod students;
pub mod teachers;
