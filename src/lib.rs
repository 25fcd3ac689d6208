pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod flows;
pub mod forms;
pub mod narrative;
