use colored::Colorize;
use mapsplit_core::{
    Confirm, MapsplitError, Outcome, Output, OutputPaths, OutputState, Result, Summary,
};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::Path;

fn file_name(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| p.display().to_string())
}

pub fn progress(msg: &str) {
    println!("{}", msg.green());
}

pub fn warn(msg: &str) {
    println!("{}", msg.yellow());
}

pub fn error(e: &MapsplitError) {
    eprintln!("{}", format!("Error: {e}").red());
}

/// Asks on stdin; only `y` or `yes` confirms.
pub struct StdinConfirm {
    /// Keep stdout clean for machine-readable output.
    pub to_stderr: bool,
}

impl Confirm for StdinConfirm {
    fn confirm(&mut self, state: OutputState, paths: &OutputPaths) -> bool {
        let warning = format!(
            "Warning: Output already exists for {} ({state})",
            file_name(&paths.final_path)
        );
        if self.to_stderr {
            eprintln!("{}", warning.yellow());
            eprint!("Overwrite? (y/N): ");
            let _ = std::io::stderr().flush();
        } else {
            warn(&warning);
            print!("Overwrite? (y/N): ");
            let _ = std::io::stdout().flush();
        }

        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        is_yes(&line)
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum JsonOutcome<'a> {
    Done { summary: &'a Summary },
    Cancelled,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

pub fn print_outcome_json(outcome: &Outcome) -> Result<()> {
    match outcome {
        Outcome::Done(summary) => print_json(&JsonOutcome::Done { summary }),
        Outcome::Cancelled => print_json(&JsonOutcome::Cancelled),
    }
}

pub fn print_summary(s: &Summary) {
    progress(&format!("✓ Compressed {}", file_name(&s.source_path)));
    println!(
        "Compressed size: {} MiB ({} bytes, {} from {} bytes)",
        s.compressed_len / 1024 / 1024,
        s.compressed_len,
        s.codec,
        s.source_len
    );
    match &s.output {
        Output::SingleFile { path } => {
            progress(&format!("✓ Created {}", path.display()));
            progress("✓ File size is within threshold, no splitting needed");
        }
        Output::Parts { dir, parts } => {
            progress(&format!(
                "✓ Split into {} part(s) in {}",
                parts.len(),
                dir.display()
            ));
            println!("Parts created:");
            for p in parts {
                println!("  {} ({} bytes)", file_name(&p.path), p.len);
            }
        }
    }
    progress("Done!");
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapsplit_core::CodecId;
    use std::path::PathBuf;

    #[test]
    fn only_explicit_yes_confirms() {
        for a in ["y\n", "Y", " yes \r\n", "YES"] {
            assert!(is_yes(a), "{a:?}");
        }
        for a in ["", "\n", "n", "no", "yep", "y e s"] {
            assert!(!is_yes(a), "{a:?}");
        }
    }

    #[test]
    fn outcome_json_is_tagged() {
        let summary = Summary {
            source_path: PathBuf::from("/maps/a.bsp"),
            source_len: 10,
            compressed_len: 8,
            codec: CodecId::Bzip2,
            output: Output::SingleFile {
                path: PathBuf::from("/maps/a.bsp.bz2"),
            },
        };
        let done = serde_json::to_value(JsonOutcome::Done { summary: &summary }).unwrap();
        assert_eq!(done["outcome"], "done");
        assert_eq!(done["summary"]["codec"], "bzip2");
        assert_eq!(done["summary"]["output"]["kind"], "single_file");
        assert_eq!(done["summary"]["output"]["path"], "/maps/a.bsp.bz2");

        let cancelled = serde_json::to_value(JsonOutcome::Cancelled).unwrap();
        assert_eq!(cancelled, serde_json::json!({ "outcome": "cancelled" }));
    }
}
