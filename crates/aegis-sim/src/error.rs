use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("unsupported speed {0:?} (expected 0.5, 1, 2, 5 or 10)")]
    InvalidSpeed(String),

    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("training run {0} needs at least one epoch")]
    ZeroEpochs(String),

    #[error("ticker period must be positive")]
    InvalidPeriod,
}
