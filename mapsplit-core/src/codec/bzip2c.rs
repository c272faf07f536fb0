use super::{CodecId, Compressor};
use crate::error::{MapsplitError, Result};
use bzip2::Compression;
use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;
use std::io::{Read, Write};
use std::ops::RangeInclusive;

/// bzip2 at block size 9 is what Source engine FastDL servers expect.
pub struct Bzip2Compressor;

impl Compressor for Bzip2Compressor {
    fn id(&self) -> CodecId {
        CodecId::Bzip2
    }

    fn extension(&self) -> &'static str {
        "bz2"
    }

    fn levels(&self) -> RangeInclusive<i32> {
        1..=9
    }

    fn compress(&self, src: &mut dyn Read, dst: &mut dyn Write, level: i32) -> Result<u64> {
        let level = level.clamp(1, 9) as u32;
        let mut enc = BzEncoder::new(dst, Compression::new(level));
        let written_uncompressed = std::io::copy(src, &mut enc)?;
        let dst = enc
            .finish()
            .map_err(|e| MapsplitError::Codec(format!("bzip2 finish: {e}")))?;
        dst.flush()?;
        Ok(written_uncompressed)
    }

    fn decompress(&self, src: &mut dyn Read, dst: &mut dyn Write) -> Result<u64> {
        let mut dec = BzDecoder::new(src);
        let written_uncompressed = std::io::copy(&mut dec, dst)?;
        Ok(written_uncompressed)
    }
}
