use clap::{Parser, Subcommand};
use mapsplit_core::CodecId;
use mapsplit_core::config::parse_size;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Compress map files and split them for size-limited hosts",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

fn size_arg(s: &str) -> Result<u64, String> {
    parse_size(s).map_err(|e| e.to_string())
}

fn codec_arg(s: &str) -> Result<CodecId, String> {
    s.parse().map_err(|e: mapsplit_core::MapsplitError| e.to_string())
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress a map, splitting the result into parts when it is too large
    Compress {
        map: PathBuf,

        /// Compressed size above which the output is split (bytes, or KiB/MiB/GiB)
        #[arg(long, default_value = "25MiB", value_parser = size_arg)]
        threshold: u64,

        /// Size of each part when splitting
        #[arg(long = "chunk-size", default_value = "20MiB", value_parser = size_arg)]
        chunk_size: u64,

        /// bzip2 (FastDL), zstd or store
        #[arg(long, default_value = "bzip2", value_parser = codec_arg)]
        codec: CodecId,

        /// Codec level; defaults to the codec's maximum
        #[arg(long)]
        level: Option<i32>,

        /// Overwrite existing output without asking
        #[arg(short, long)]
        yes: bool,

        /// Accept inputs without a .bsp extension
        #[arg(long)]
        any_ext: bool,

        /// Print the outcome as JSON on stdout instead of colored text
        #[arg(long)]
        json: bool,
    },

    /// Reassemble a parts directory into one compressed file
    Join {
        /// `<map>.<ext>.parts` directory
        parts_dir: PathBuf,
        out: PathBuf,
    },

    /// Check that the output for a map decodes back to the map
    Verify {
        map: PathBuf,

        #[arg(long, default_value = "bzip2", value_parser = codec_arg)]
        codec: CodecId,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}
