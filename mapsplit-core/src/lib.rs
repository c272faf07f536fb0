#![forbid(unsafe_code)]

pub mod error;

pub mod chunker;
pub mod codec;
pub mod compress;
pub mod config;
pub mod layout;
pub mod pipeline;
pub mod reconcile;
pub mod threshold;
pub mod verify;

// Re-exports: stable API surface
pub use chunker::{Part, PartsReader, join, split};
pub use codec::{CodecId, Compressor};
pub use config::SplitConfig;
pub use error::{MapsplitError, Result};
pub use layout::OutputPaths;
pub use pipeline::{Outcome, Output, Stage, Summary, run, run_observed};
pub use reconcile::{Confirm, Decision, OutputState, reconcile};
pub use threshold::needs_split;
pub use verify::{VerifyReport, verify};
