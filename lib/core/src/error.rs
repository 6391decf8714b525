use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Which side of a comparison a payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadOrigin {
    Generated,
    GroundTruth,
}

impl fmt::Display for PayloadOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadOrigin::Generated => write!(f, "generated"),
            PayloadOrigin::GroundTruth => write!(f, "ground truth"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Ambiguous alias '{synonym}': mapped to both '{first}' and '{second}'")]
    AmbiguousAlias {
        synonym: String,
        first: String,
        second: String,
    },

    #[error("Parse error in {origin} payload: {message}")]
    Parse {
        origin: PayloadOrigin,
        message: String,
    },

    #[error("Shape error in {origin} payload: {message}")]
    Shape {
        origin: PayloadOrigin,
        message: String,
    },

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn parse(origin: PayloadOrigin, message: impl Into<String>) -> Self {
        Error::Parse { origin, message: message.into() }
    }

    pub fn shape(origin: PayloadOrigin, message: impl Into<String>) -> Self {
        Error::Shape { origin, message: message.into() }
    }

    /// Configuration errors make every score of the run unreliable and abort it.
    /// Everything else is recovered per prompt.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_) | Error::AmbiguousAlias { .. })
    }
}
