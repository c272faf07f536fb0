pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use mapsplit_core::Result;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Compress {
            map,
            threshold,
            chunk_size,
            codec,
            level,
            yes,
            any_ext,
            json,
        } => handlers::handle_compress(
            map, threshold, chunk_size, codec, level, yes, any_ext, json,
        ),
        Commands::Join { parts_dir, out } => handlers::handle_join(parts_dir, out),
        Commands::Verify { map, codec, json } => handlers::handle_verify(map, codec, json),
    }
}
