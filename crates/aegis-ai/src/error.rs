use aegis_core::ModelError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AiError {
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    #[error("no planned route with id {0}")]
    UnknownRoute(String),

    #[error("model produced an invalid record: {0}")]
    Model(#[from] ModelError),
}
