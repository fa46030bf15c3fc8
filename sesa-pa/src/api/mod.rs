//! HTTP API for sesa-pa

pub mod assess;
pub mod config;
pub mod health;
pub mod history;

pub use assess::assessment_routes;
pub use config::config_routes;
pub use health::health_routes;
pub use history::history_routes;
