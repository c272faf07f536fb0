use super::{CodecId, Compressor};
use crate::error::{MapsplitError, Result};
use std::io::{Read, Write};
use std::ops::RangeInclusive;

pub struct ZstdCompressor;

impl Compressor for ZstdCompressor {
    fn id(&self) -> CodecId {
        CodecId::Zstd
    }

    fn extension(&self) -> &'static str {
        "zst"
    }

    fn levels(&self) -> RangeInclusive<i32> {
        1..=*zstd::compression_level_range().end()
    }

    fn compress(&self, src: &mut dyn Read, dst: &mut dyn Write, level: i32) -> Result<u64> {
        let mut enc = zstd::stream::Encoder::new(dst, level.max(1))
            .map_err(|e| MapsplitError::Codec(format!("zstd init: {e}")))?;
        #[cfg(feature = "zstdmt")]
        {
            let workers = std::thread::available_parallelism().map_or(1, |n| n.get()) as u32;
            enc.multithread(workers)
                .map_err(|e| MapsplitError::Codec(format!("zstd workers: {e}")))?;
        }
        let written_uncompressed = std::io::copy(src, &mut enc)?;
        // finish() instead of auto_finish(): a failed trailer must not be swallowed on drop.
        let dst = enc
            .finish()
            .map_err(|e| MapsplitError::Codec(format!("zstd finish: {e}")))?;
        dst.flush()?;
        Ok(written_uncompressed)
    }

    fn decompress(&self, src: &mut dyn Read, dst: &mut dyn Write) -> Result<u64> {
        let mut dec = zstd::stream::Decoder::new(src)
            .map_err(|e| MapsplitError::Codec(format!("zstd init: {e}")))?;
        let written_uncompressed = std::io::copy(&mut dec, dst)?;
        Ok(written_uncompressed)
    }
}
