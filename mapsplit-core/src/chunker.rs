use crate::error::{MapsplitError, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::trace;

const COPY_BUF: usize = 1 << 20;
const PART_INFIX: &str = ".part.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub index: usize,
    pub path: PathBuf,
    pub len: u64,
}

/// `<base>.part.NNN`, zero-padded to three digits and wider past 999.
pub fn part_file_name(base_name: &str, index: usize) -> String {
    format!("{base_name}{PART_INFIX}{index:03}")
}

/// Accepts only the exact spelling `part_file_name` produces, so `.part.0001`
/// cannot alias `.part.001`.
fn parse_part_index(base_name: &str, file_name: &str) -> Option<usize> {
    let digits = file_name.strip_prefix(base_name)?.strip_prefix(PART_INFIX)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = digits.parse().ok()?;
    (part_file_name(base_name, index) == file_name).then_some(index)
}

/// Fills `buf` from `r` until it is full or the reader is exhausted.
fn read_full(r: &mut dyn Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Cuts `src` into consecutive parts of `chunk_size` bytes inside `dest_dir`.
///
/// Every part except the last holds exactly `chunk_size` bytes; the last holds
/// the remainder. An empty source yields no parts. Each part is synced and
/// closed before the next one is created. On error, parts already written are
/// left in place.
pub fn split(
    src: &mut dyn Read,
    dest_dir: &Path,
    base_name: &str,
    chunk_size: u64,
) -> Result<Vec<Part>> {
    if chunk_size == 0 {
        return Err(MapsplitError::Config("chunk size must be positive".into()));
    }
    let mut buf = vec![0u8; chunk_size.min(COPY_BUF as u64) as usize];
    let mut parts = Vec::new();

    loop {
        let mut limited = (&mut *src).take(chunk_size);
        let first = read_full(&mut limited, &mut buf)?;
        if first == 0 {
            break;
        }

        let index = parts.len();
        let path = dest_dir.join(part_file_name(base_name, index));
        let mut f = File::create(&path)?;
        f.write_all(&buf[..first])?;
        let mut len = first as u64;
        loop {
            let n = read_full(&mut limited, &mut buf)?;
            if n == 0 {
                break;
            }
            f.write_all(&buf[..n])?;
            len += n as u64;
        }
        f.sync_all()?;
        drop(f);

        trace!(index, len, path = %path.display(), "part written");
        parts.push(Part { index, path, len });
        if len < chunk_size {
            break;
        }
    }

    Ok(parts)
}

/// Part files of `base_name` inside `dir`, ordered by index.
/// Unrelated entries are ignored.
pub fn list_parts(dir: &Path, base_name: &str) -> Result<Vec<Part>> {
    let mut parts = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(index) = parse_part_index(base_name, &name.to_string_lossy()) else {
            continue;
        };
        parts.push(Part {
            index,
            path: entry.path(),
            len: entry.metadata()?.len(),
        });
    }
    parts.sort_by_key(|p| p.index);
    Ok(parts)
}

/// Base name encoded in a `<base>.parts` directory name.
pub fn base_name_for_parts_dir(dir: &Path) -> Option<String> {
    let name = dir.file_name()?.to_string_lossy().into_owned();
    name.strip_suffix(".parts")
        .filter(|b| !b.is_empty())
        .map(str::to_owned)
}

/// Reads the parts of one split artifact back as a single stream.
pub struct PartsReader {
    pending: std::vec::IntoIter<Part>,
    current: Option<File>,
}

impl PartsReader {
    /// Fails with `Format` when there are no parts or an index is missing.
    pub fn open(dir: &Path, base_name: &str) -> Result<Self> {
        let parts = list_parts(dir, base_name)?;
        if parts.is_empty() {
            return Err(MapsplitError::Format(format!(
                "no parts for {base_name} in {}",
                dir.display()
            )));
        }
        for (expected, part) in parts.iter().enumerate() {
            if part.index != expected {
                return Err(MapsplitError::Format(format!(
                    "missing part {} in {}",
                    part_file_name(base_name, expected),
                    dir.display()
                )));
            }
        }
        Ok(Self {
            pending: parts.into_iter(),
            current: None,
        })
    }
}

impl Read for PartsReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        loop {
            if let Some(f) = self.current.as_mut() {
                let n = f.read(buf)?;
                if n > 0 || buf.is_empty() {
                    return Ok(n);
                }
                self.current = None;
            }
            match self.pending.next() {
                Some(part) => self.current = Some(File::open(&part.path)?),
                None => return Ok(0),
            }
        }
    }
}

/// Concatenates the parts in `dir` into `dst` in index order.
pub fn join(dir: &Path, base_name: &str, dst: &mut dyn Write) -> Result<u64> {
    let mut reader = PartsReader::open(dir, base_name)?;
    let total = std::io::copy(&mut reader, dst)?;
    dst.flush()?;
    Ok(total)
}
