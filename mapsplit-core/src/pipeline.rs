use crate::chunker::{self, Part};
use crate::codec::CodecId;
use crate::compress::compress_file;
use crate::config::SplitConfig;
use crate::error::{MapsplitError, Result};
use crate::layout::OutputPaths;
use crate::reconcile::{Confirm, Decision, reconcile};
use crate::threshold::needs_split;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Reconciling,
    Compressing,
    Evaluating,
    Splitting,
    Finalizing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Reconciling => "reconciling prior output",
            Stage::Compressing => "compression",
            Stage::Evaluating => "size check",
            Stage::Splitting => "splitting",
            Stage::Finalizing => "finalizing",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Output {
    SingleFile { path: PathBuf },
    Parts { dir: PathBuf, parts: Vec<Part> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub source_path: PathBuf,
    pub source_len: u64,
    pub compressed_len: u64,
    pub codec: CodecId,
    pub output: Output,
}

impl Summary {
    pub fn part_count(&self) -> usize {
        match &self.output {
            Output::SingleFile { .. } => 0,
            Output::Parts { parts, .. } => parts.len(),
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self.output, Output::Parts { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Done(Summary),
    /// Prior output existed and the caller declined to overwrite it.
    Cancelled,
}

fn at(stage: Stage) -> impl FnOnce(MapsplitError) -> MapsplitError {
    move |e| MapsplitError::Stage {
        stage,
        source: Box::new(e),
    }
}

/// Compresses `source` and splits the result when it exceeds the threshold.
///
/// Stages run strictly in order. A failing stage aborts the run and leaves
/// whatever was already written; the next run's reconcile step clears it.
/// At most one run per source path may be in flight at a time.
pub fn run(source: &Path, config: &SplitConfig, confirm: &mut dyn Confirm) -> Result<Outcome> {
    run_observed(source, config, confirm, &mut |_: Stage| {})
}

/// Same as [`run`], calling `on_stage` as each stage begins.
pub fn run_observed(
    source: &Path,
    config: &SplitConfig,
    confirm: &mut dyn Confirm,
    on_stage: &mut dyn FnMut(Stage),
) -> Result<Outcome> {
    config.validate()?;
    let codec = config.codec.compressor();
    let level = config.effective_level();
    let paths = OutputPaths::for_source(source, codec.extension());

    let span = info_span!("run", source = %source.display(), codec = %config.codec);
    let _enter = span.enter();
    let mut enter = |stage: Stage| {
        debug!(%stage, "entering stage");
        on_stage(stage);
    };

    enter(Stage::Reconciling);
    if reconcile(&paths, confirm).map_err(at(Stage::Reconciling))? == Decision::Cancelled {
        return Ok(Outcome::Cancelled);
    }

    enter(Stage::Compressing);
    let artifact =
        compress_file(source, &paths.final_path, codec, level).map_err(at(Stage::Compressing))?;
    info!(
        level,
        source_len = artifact.source_len,
        compressed_len = artifact.len,
        "compressed"
    );

    enter(Stage::Evaluating);
    let output = if needs_split(artifact.len, config.threshold_bytes) {
        info!(
            threshold = config.threshold_bytes,
            chunk_size = config.chunk_size_bytes,
            "artifact exceeds threshold, splitting"
        );
        enter(Stage::Splitting);
        let written =
            split_artifact(&paths, config.chunk_size_bytes).map_err(at(Stage::Splitting))?;

        enter(Stage::Finalizing);
        let parts =
            finalize_split(&paths, &written, artifact.len).map_err(at(Stage::Finalizing))?;
        info!(parts = parts.len(), dir = %paths.parts_dir.display(), "split complete");
        Output::Parts {
            dir: paths.parts_dir.clone(),
            parts,
        }
    } else {
        enter(Stage::Finalizing);
        info!(threshold = config.threshold_bytes, "within threshold, no split needed");
        Output::SingleFile {
            path: paths.final_path.clone(),
        }
    };

    Ok(Outcome::Done(Summary {
        source_path: source.to_path_buf(),
        source_len: artifact.source_len,
        compressed_len: artifact.len,
        codec: config.codec,
        output,
    }))
}

fn split_artifact(paths: &OutputPaths, chunk_size: u64) -> Result<Vec<Part>> {
    fs::create_dir_all(&paths.parts_dir)?;
    let mut input = BufReader::new(File::open(&paths.final_path)?);
    chunker::split(&mut input, &paths.parts_dir, &paths.base_name, chunk_size)
}

/// Drops the unsplit artifact once every part is on disk, then lists the parts.
fn finalize_split(paths: &OutputPaths, written: &[Part], expected_len: u64) -> Result<Vec<Part>> {
    let total: u64 = written.iter().map(|p| p.len).sum();
    if total != expected_len {
        return Err(MapsplitError::Format(format!(
            "parts hold {total} bytes, artifact has {expected_len}"
        )));
    }
    fs::remove_file(&paths.final_path)?;

    let listed = chunker::list_parts(&paths.parts_dir, &paths.base_name)?;
    if listed.len() != written.len() {
        return Err(MapsplitError::Format(format!(
            "expected {} parts in {}, found {}",
            written.len(),
            paths.parts_dir.display(),
            listed.len()
        )));
    }
    Ok(listed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::OutputState;

    fn never(_: OutputState, _: &OutputPaths) -> bool {
        panic!("confirm must not be called")
    }

    fn store_config(threshold: u64, chunk: u64) -> SplitConfig {
        SplitConfig {
            threshold_bytes: threshold,
            chunk_size_bytes: chunk,
            codec: CodecId::Store,
            level: None,
        }
    }

    #[test]
    fn invalid_config_fails_before_io() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("m.bsp");
        fs::write(&src, b"data").unwrap();

        let err = run(&src, &store_config(10, 0), &mut never).unwrap_err();
        assert!(matches!(err, MapsplitError::Config(_)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_source_fails_in_compression_stage() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&dir.path().join("gone.bsp"), &store_config(10, 4), &mut never).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Compressing));
        assert!(matches!(err.root_cause(), MapsplitError::Io(_)));
    }

    #[test]
    fn exactly_at_threshold_stays_single() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("m.bsp");
        fs::write(&src, vec![1u8; 100]).unwrap();

        let Outcome::Done(summary) = run(&src, &store_config(100, 30), &mut never).unwrap() else {
            panic!("expected Done");
        };
        assert!(!summary.is_split());
        assert_eq!(summary.compressed_len, 100);
        assert!(!dir.path().join("m.bsp.raw.parts").exists());
    }

    #[test]
    fn one_byte_over_threshold_splits() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("m.bsp");
        let data: Vec<u8> = (0..101u8).collect();
        fs::write(&src, &data).unwrap();

        let Outcome::Done(summary) = run(&src, &store_config(100, 30), &mut never).unwrap() else {
            panic!("expected Done");
        };
        let Output::Parts { dir: parts_dir, parts } = &summary.output else {
            panic!("expected parts");
        };
        assert_eq!(parts_dir, &dir.path().join("m.bsp.raw.parts"));
        let lens: Vec<u64> = parts.iter().map(|p| p.len).collect();
        assert_eq!(lens, vec![30, 30, 30, 11]);
        assert!(!dir.path().join("m.bsp.raw").exists());
        assert_eq!(fs::read(&src).unwrap(), data);
    }

    #[test]
    fn split_failure_keeps_intermediate_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("m.bsp");
        fs::write(&src, vec![9u8; 64]).unwrap();
        // A plain file where the parts directory belongs.
        fs::write(dir.path().join("m.bsp.raw.parts"), b"blocker").unwrap();

        let err = run(&src, &store_config(10, 16), &mut never).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Splitting));
        assert!(matches!(err.root_cause(), MapsplitError::Io(_)));
        assert_eq!(fs::read(dir.path().join("m.bsp.raw")).unwrap().len(), 64);
    }

    #[test]
    fn stages_are_reported_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("m.bsp");
        fs::write(&src, vec![3u8; 50]).unwrap();

        let mut seen = Vec::new();
        let mut record = |s: Stage| seen.push(s);
        run_observed(&src, &store_config(10, 20), &mut never, &mut record).unwrap();
        assert_eq!(
            seen,
            vec![
                Stage::Reconciling,
                Stage::Compressing,
                Stage::Evaluating,
                Stage::Splitting,
                Stage::Finalizing
            ]
        );

        let mut seen = Vec::new();
        let mut record = |s: Stage| seen.push(s);
        let mut decline = |_: OutputState, _: &OutputPaths| false;
        let outcome =
            run_observed(&src, &store_config(10, 20), &mut decline, &mut record).unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(seen, vec![Stage::Reconciling]);
    }

    #[test]
    fn summary_serializes_to_json_and_back() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("m.bsp");
        fs::write(&src, vec![5u8; 70]).unwrap();

        let Outcome::Done(summary) = run(&src, &store_config(10, 32), &mut never).unwrap() else {
            panic!("expected Done");
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["codec"], "store");
        assert_eq!(json["output"]["kind"], "parts");
        assert_eq!(json["output"]["parts"].as_array().unwrap().len(), 3);
        assert_eq!(json["output"]["parts"][2]["len"], 6);

        let back: Summary = serde_json::from_value(json).unwrap();
        assert_eq!(back, summary);
    }
}
