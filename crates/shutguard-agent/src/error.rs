//! Error types for the shutguard-agent crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Core(#[from] shutguard_core::CoreError),

    #[error("Config error: {0}")]
    Config(String),
}

/// Failure to run the power-off command.
#[derive(Error, Debug)]
pub enum PowerError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} returned non-zero {status}")]
    Failed { program: String, status: String },
}

pub type Result<T> = std::result::Result<T, AgentError>;
