use crate::pipeline::Stage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapsplitError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<MapsplitError>,
    },
}

impl MapsplitError {
    /// Strips any stage wrappers and returns the error that actually occurred.
    pub fn root_cause(&self) -> &MapsplitError {
        match self {
            MapsplitError::Stage { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            MapsplitError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, MapsplitError>;
