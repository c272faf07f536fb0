use super::{CodecId, Compressor};
use crate::error::Result;
use std::io::{Read, Write};
use std::ops::RangeInclusive;

/// Pass-through codec for inputs that are already compressed.
pub struct Store;

impl Compressor for Store {
    fn id(&self) -> CodecId {
        CodecId::Store
    }

    fn extension(&self) -> &'static str {
        "raw"
    }

    fn levels(&self) -> RangeInclusive<i32> {
        0..=0
    }

    fn compress(&self, src: &mut dyn Read, dst: &mut dyn Write, _level: i32) -> Result<u64> {
        let n = std::io::copy(src, dst)?;
        dst.flush()?;
        Ok(n)
    }

    fn decompress(&self, src: &mut dyn Read, dst: &mut dyn Write) -> Result<u64> {
        Ok(std::io::copy(src, dst)?)
    }
}
