use std::time::Duration;
use thiserror::Error;

/// Startup failures; the process refuses to run on any of these.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Why a backlog entry was not confirmed. The entry stays in the backlog.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("marketplace answered with status {0}")]
    Status(u16),

    #[error("marketplace rejected the offer: {0}")]
    Rejected(String),

    #[error("offer not found on category page {node_id}")]
    NotVerified { node_id: String },

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to build form: {0}")]
    Form(String),
}
