use thiserror::Error;

/// Boxed error produced by a pluggable collaborator (hasher, clock, ...)
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Exhausted entropy: no unique token after {attempts} attempts")]
    ExhaustedEntropy { attempts: u32 },

    #[error("Clock error: {0}")]
    Clock(String),

    #[error("Entropy source error: {0}")]
    Entropy(String),

    #[error("Hasher error: {0}")]
    Hasher(#[source] BoxError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
