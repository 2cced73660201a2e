//! Shared domain types for the outage dashboard.
//!
//! Holds the static area reference table, the single area-code extraction
//! rule, time-window parsing, and application configuration. Nothing in this
//! crate performs I/O beyond reading the process environment.

pub mod app_config;
pub mod area;
pub mod config;
pub mod types;
pub mod window;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use area::{lookup_area, AreaCode, AreaCoordinate, AREA_COORDINATES};
pub use config::{load_app_config, load_app_config_from_env};
pub use types::{
    CallTranscript, ChatMessage, ChatRole, IncidentStatus, IncidentSubmission, OutageWindow,
};
pub use window::{parse_date, TimeWindow, DEFAULT_WINDOW_HOURS, MAX_WINDOW_HOURS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid area code: {0}")]
    InvalidAreaCode(String),
    #[error("invalid time window: {0}")]
    InvalidWindow(String),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}
