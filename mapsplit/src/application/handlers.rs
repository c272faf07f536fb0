use std::fs::File;
use std::io::{BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use mapsplit_core::chunker::base_name_for_parts_dir;
use mapsplit_core::config::MIB;
use mapsplit_core::{
    CodecId, MapsplitError, Outcome, OutputPaths, OutputState, PartsReader, Result, SplitConfig,
    Stage, run_observed, verify,
};

use crate::presentation::console::{self, StdinConfirm};
use tracing::debug;

const MAP_EXTENSION: &str = "bsp";

/// Existing regular file, optionally with a `.bsp` extension, made absolute.
fn validate_map(map: &Path, any_ext: bool) -> Result<PathBuf> {
    if !map.is_file() {
        return Err(std::io::Error::new(
            ErrorKind::NotFound,
            format!("file not found: {}", map.display()),
        )
        .into());
    }
    let has_ext = map
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(MAP_EXTENSION));
    if !any_ext && !has_ext {
        return Err(MapsplitError::Config(format!(
            "file must have .{MAP_EXTENSION} extension (or pass --any-ext)"
        )));
    }
    Ok(std::path::absolute(map)?)
}

/// Console lines announcing a stage; reconcile output comes from the prompt itself.
fn stage_messages(stage: Stage, source: &Path, config: &SplitConfig) -> Vec<(bool, String)> {
    match stage {
        Stage::Compressing => vec![(
            false,
            format!(
                "Compressing {} to {}...",
                source.file_name().unwrap_or_default().to_string_lossy(),
                config.codec
            ),
        )],
        Stage::Splitting => vec![
            (
                true,
                format!("File exceeds {} bytes threshold", config.threshold_bytes),
            ),
            (
                false,
                format!(
                    "Splitting into {} MiB chunks...",
                    config.chunk_size_bytes / MIB
                ),
            ),
        ],
        Stage::Reconciling | Stage::Evaluating | Stage::Finalizing => Vec::new(),
    }
}

pub fn handle_compress(
    map: PathBuf,
    threshold: u64,
    chunk_size: u64,
    codec: CodecId,
    level: Option<i32>,
    yes: bool,
    any_ext: bool,
    json: bool,
) -> Result<()> {
    let config = SplitConfig {
        threshold_bytes: threshold,
        chunk_size_bytes: chunk_size,
        codec,
        level,
    };
    config.validate()?;
    let source = validate_map(&map, any_ext)?;
    debug!(?config, source = %source.display(), "starting run");

    let mut announce = |stage: Stage| {
        if json {
            return;
        }
        for (warning, msg) in stage_messages(stage, &source, &config) {
            if warning {
                console::warn(&msg);
            } else {
                console::progress(&msg);
            }
        }
    };

    let outcome = if yes {
        let mut accept = |_: OutputState, _: &OutputPaths| true;
        run_observed(&source, &config, &mut accept, &mut announce)?
    } else {
        let mut prompt = StdinConfirm { to_stderr: json };
        run_observed(&source, &config, &mut prompt, &mut announce)?
    };

    if json {
        return console::print_outcome_json(&outcome);
    }
    match outcome {
        Outcome::Cancelled => println!("Cancelled"),
        Outcome::Done(summary) => console::print_summary(&summary),
    }
    Ok(())
}

/// Checks the parts before touching `out`, so a broken set leaves it alone.
pub fn handle_join(parts_dir: PathBuf, out: PathBuf) -> Result<()> {
    let base_name = base_name_for_parts_dir(&parts_dir).ok_or_else(|| {
        MapsplitError::Config(format!(
            "{} is not a .parts directory",
            parts_dir.display()
        ))
    })?;
    let mut reader = PartsReader::open(&parts_dir, &base_name)?;
    let mut writer = BufWriter::new(File::create(&out)?);
    let n = std::io::copy(&mut reader, &mut writer)?;
    writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    console::progress(&format!("✓ Joined {n} bytes into {}", out.display()));
    Ok(())
}

pub fn handle_verify(map: PathBuf, codec: CodecId, json: bool) -> Result<()> {
    let report = verify(&map, codec)?;
    if json {
        return console::print_json(&report);
    }
    console::progress(&format!(
        "✓ {} decodes to the source ({} bytes, blake3 {})",
        report.state, report.source_len, report.digest
    ));
    Ok(())
}
