use crate::gateway::GatewayError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StashError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Unauthorized")]
    Unauthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Other error: {0}")]
    Other(String),
}
