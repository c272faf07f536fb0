use crate::error::Result;
use crate::layout::OutputPaths;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// What a previous run left behind for a source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputState {
    Absent,
    SingleFile,
    PartsDirectory,
    /// Final file and parts directory together; a split that failed before
    /// the intermediate artifact was removed leaves this.
    Both,
}

impl fmt::Display for OutputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputState::Absent => "no output",
            OutputState::SingleFile => "compressed file",
            OutputState::PartsDirectory => "parts directory",
            OutputState::Both => "compressed file and parts directory",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Cancelled,
}

/// Asks the caller whether existing output may be deleted.
pub trait Confirm {
    fn confirm(&mut self, state: OutputState, paths: &OutputPaths) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(OutputState, &OutputPaths) -> bool,
{
    fn confirm(&mut self, state: OutputState, paths: &OutputPaths) -> bool {
        self(state, paths)
    }
}

fn is_file(p: &Path) -> Result<bool> {
    match fs::metadata(p) {
        Ok(md) => Ok(md.is_file()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn is_dir(p: &Path) -> Result<bool> {
    match fs::metadata(p) {
        Ok(md) => Ok(md.is_dir()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

pub fn output_state(paths: &OutputPaths) -> Result<OutputState> {
    let file = is_file(&paths.final_path)?;
    let dir = is_dir(&paths.parts_dir)?;
    Ok(match (file, dir) {
        (false, false) => OutputState::Absent,
        (true, false) => OutputState::SingleFile,
        (false, true) => OutputState::PartsDirectory,
        (true, true) => OutputState::Both,
    })
}

/// Clears prior output for `paths` if `confirm` allows it.
///
/// With nothing on disk this returns `Proceed` without calling `confirm`.
/// A declined confirmation touches nothing.
pub fn reconcile(paths: &OutputPaths, confirm: &mut dyn Confirm) -> Result<Decision> {
    let state = output_state(paths)?;
    if state == OutputState::Absent {
        debug!(path = %paths.final_path.display(), "no prior output");
        return Ok(Decision::Proceed);
    }
    if !confirm.confirm(state, paths) {
        info!(%state, "overwrite declined");
        return Ok(Decision::Cancelled);
    }
    if matches!(state, OutputState::SingleFile | OutputState::Both) {
        fs::remove_file(&paths.final_path)?;
    }
    if matches!(state, OutputState::PartsDirectory | OutputState::Both) {
        fs::remove_dir_all(&paths.parts_dir)?;
    }
    info!(%state, "prior output removed");
    Ok(Decision::Proceed)
}
