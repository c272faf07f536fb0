use crate::codec::CodecId;
use crate::error::{MapsplitError, Result};

pub const MIB: u64 = 1024 * 1024;
/// Compressed size above which the output is split.
pub const DEFAULT_THRESHOLD_BYTES: u64 = 25 * MIB;
pub const DEFAULT_CHUNK_SIZE_BYTES: u64 = 20 * MIB;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitConfig {
    pub threshold_bytes: u64,
    pub chunk_size_bytes: u64,
    pub codec: CodecId,
    /// Codec level; `None` selects the codec's maximum.
    pub level: Option<i32>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            threshold_bytes: DEFAULT_THRESHOLD_BYTES,
            chunk_size_bytes: DEFAULT_CHUNK_SIZE_BYTES,
            codec: CodecId::default(),
            level: None,
        }
    }
}

impl SplitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.threshold_bytes == 0 {
            return Err(MapsplitError::Config("threshold must be positive".into()));
        }
        if self.chunk_size_bytes == 0 {
            return Err(MapsplitError::Config("chunk size must be positive".into()));
        }
        if usize::try_from(self.chunk_size_bytes).is_err() {
            return Err(MapsplitError::Config(format!(
                "chunk size {} does not fit in memory on this platform",
                self.chunk_size_bytes
            )));
        }
        if let Some(level) = self.level {
            let levels = self.codec.compressor().levels();
            if !levels.contains(&level) {
                return Err(MapsplitError::Config(format!(
                    "{} level {level} outside {}..={}",
                    self.codec,
                    levels.start(),
                    levels.end()
                )));
            }
        }
        Ok(())
    }

    pub fn effective_level(&self) -> i32 {
        self.level
            .unwrap_or_else(|| self.codec.compressor().max_level())
    }
}

/// Parses a byte size such as `26214400`, `20MiB`, `512 KiB` or `1G`.
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);
    let n: u64 = digits
        .parse()
        .map_err(|_| MapsplitError::Config(format!("invalid size: {s:?}")))?;
    let mul = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kib" => 1024,
        "m" | "mib" => MIB,
        "g" | "gib" => 1024 * MIB,
        _ => return Err(MapsplitError::Config(format!("invalid size unit: {s:?}"))),
    };
    n.checked_mul(mul)
        .ok_or_else(|| MapsplitError::Config(format!("size overflows: {s:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behaviour() {
        let cfg = SplitConfig::default();
        assert_eq!(cfg.threshold_bytes, 26_214_400);
        assert_eq!(cfg.chunk_size_bytes, 20_971_520);
        assert_eq!(cfg.codec, CodecId::Bzip2);
        assert_eq!(cfg.effective_level(), 9);
        cfg.validate().unwrap();
    }

    #[test]
    fn rejects_non_positive_sizes() {
        let cfg = SplitConfig {
            chunk_size_bytes: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(MapsplitError::Config(_))));

        let cfg = SplitConfig {
            threshold_bytes: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(MapsplitError::Config(_))));
    }

    #[test]
    fn rejects_out_of_range_level() {
        let cfg = SplitConfig {
            level: Some(10),
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(MapsplitError::Config(_))));

        let cfg = SplitConfig {
            codec: CodecId::Zstd,
            level: Some(19),
            ..Default::default()
        };
        cfg.validate().unwrap();
        assert_eq!(cfg.effective_level(), 19);
    }

    #[test]
    fn parses_sizes_with_units() {
        assert_eq!(parse_size("26214400").unwrap(), 26_214_400);
        assert_eq!(parse_size("20MiB").unwrap(), 20 * MIB);
        assert_eq!(parse_size("512 KiB").unwrap(), 512 * 1024);
        assert_eq!(parse_size("1g").unwrap(), 1024 * MIB);
        assert!(parse_size("MiB").is_err());
        assert!(parse_size("12 parsecs").is_err());
        assert!(parse_size("99999999999999999999G").is_err());
    }
}
