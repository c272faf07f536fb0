use crate::chunker::PartsReader;
use crate::codec::CodecId;
use crate::error::{MapsplitError, Result};
use crate::layout::OutputPaths;
use crate::reconcile::{OutputState, output_state};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    pub state: OutputState,
    pub source_len: u64,
    pub decoded_len: u64,
    /// blake3 of the source, hex encoded.
    pub digest: String,
}

/// Decodes the output produced for `source` and checks it against the source.
pub fn verify(source: &Path, codec: CodecId) -> Result<VerifyReport> {
    let compressor = codec.compressor();
    let paths = OutputPaths::for_source(source, compressor.extension());
    let state = output_state(&paths)?;

    let mut packed: Box<dyn Read> = match state {
        OutputState::SingleFile => Box::new(BufReader::new(File::open(&paths.final_path)?)),
        OutputState::PartsDirectory => Box::new(BufReader::new(PartsReader::open(
            &paths.parts_dir,
            &paths.base_name,
        )?)),
        OutputState::Absent => {
            return Err(MapsplitError::Format(format!(
                "no output for {}",
                source.display()
            )));
        }
        OutputState::Both => {
            return Err(MapsplitError::Format(format!(
                "both {} and {} exist; rerun to clear the interrupted output",
                paths.final_path.display(),
                paths.parts_dir.display()
            )));
        }
    };

    let mut expected = blake3::Hasher::new();
    let source_len = std::io::copy(&mut File::open(source)?, &mut expected)?;
    let expected = expected.finalize();

    let mut actual = blake3::Hasher::new();
    let decoded_len = compressor.decompress(&mut packed, &mut actual)?;
    let actual = actual.finalize();

    if decoded_len != source_len || actual != expected {
        return Err(MapsplitError::Format(format!(
            "decoded output differs from {} ({decoded_len} vs {source_len} bytes)",
            source.display()
        )));
    }
    info!(%state, source_len, digest = %expected.to_hex(), "verified");

    Ok(VerifyReport {
        state,
        source_len,
        decoded_len,
        digest: expected.to_hex().to_string(),
    })
}
