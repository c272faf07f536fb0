use crate::error::{MapsplitError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use std::ops::RangeInclusive;
use std::str::FromStr;

#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecId {
    Store = 0,
    Zstd = 1,
    #[default]
    Bzip2 = 2,
}

pub trait Compressor: Send + Sync {
    fn id(&self) -> CodecId;
    /// File extension appended to the source path, without the dot.
    fn extension(&self) -> &'static str;
    fn levels(&self) -> RangeInclusive<i32>;
    /// Streams `src` into `dst`, finalizing the codec trailer before returning.
    /// Returns the number of uncompressed bytes consumed.
    fn compress(&self, src: &mut dyn Read, dst: &mut dyn Write, level: i32) -> Result<u64>;
    fn decompress(&self, src: &mut dyn Read, dst: &mut dyn Write) -> Result<u64>;

    fn max_level(&self) -> i32 {
        *self.levels().end()
    }
}

impl CodecId {
    pub fn compressor(self) -> &'static dyn Compressor {
        match self {
            CodecId::Store => &store::Store,
            CodecId::Zstd => &zstdc::ZstdCompressor,
            CodecId::Bzip2 => &bzip2c::Bzip2Compressor,
        }
    }

    pub fn extension(self) -> &'static str {
        self.compressor().extension()
    }

    pub fn name(self) -> &'static str {
        match self {
            CodecId::Store => "store",
            CodecId::Zstd => "zstd",
            CodecId::Bzip2 => "bzip2",
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodecId {
    type Err = MapsplitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "store" | "raw" => Ok(CodecId::Store),
            "zstd" | "zst" => Ok(CodecId::Zstd),
            "bzip2" | "bz2" => Ok(CodecId::Bzip2),
            other => Err(MapsplitError::Config(format!("unknown codec: {other}"))),
        }
    }
}

pub mod bzip2c;
pub mod store;
pub mod zstdc;
