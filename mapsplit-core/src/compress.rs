use crate::codec::Compressor;
use crate::error::{MapsplitError, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const IO_BUF: usize = 1 << 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressedArtifact {
    pub path: PathBuf,
    /// Compressed length, known once the codec trailer is written.
    pub len: u64,
    /// Uncompressed bytes consumed from the source.
    pub source_len: u64,
}

/// Small Write adapter that counts bytes written
struct CountingWriter<'a, W: Write + ?Sized> {
    inner: &'a mut W,
    n: u64,
}
impl<'a, W: Write + ?Sized> CountingWriter<'a, W> {
    fn new(inner: &'a mut W) -> Self {
        Self { inner, n: 0 }
    }
}
impl<'a, W: Write + ?Sized> Write for CountingWriter<'a, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let k = self.inner.write(buf)?;
        self.n += k as u64;
        Ok(k)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Streams `src` through `codec` into `dst`.
/// Returns `(uncompressed, compressed)` byte counts.
pub fn compress(
    src: &mut dyn Read,
    dst: &mut dyn Write,
    codec: &dyn Compressor,
    level: i32,
) -> Result<(u64, u64)> {
    let mut cw = CountingWriter::new(dst);
    let consumed = codec.compress(src, &mut cw, level)?;
    Ok((consumed, cw.n))
}

/// Compresses the file at `source` into `dest`, creating or truncating it.
pub fn compress_file(
    source: &Path,
    dest: &Path,
    codec: &dyn Compressor,
    level: i32,
) -> Result<CompressedArtifact> {
    let mut input = BufReader::with_capacity(IO_BUF, File::open(source)?);
    let out = File::create(dest)?;
    let mut writer = BufWriter::with_capacity(IO_BUF, out);

    let (source_len, written) = compress(&mut input, &mut writer, codec, level)?;

    let out = writer.into_inner().map_err(|e| e.into_error())?;
    out.sync_all()?;
    let len = out.metadata()?.len();
    if len != written {
        return Err(MapsplitError::Codec(format!(
            "{} wrote {written} bytes but artifact is {len} bytes",
            codec.id()
        )));
    }
    debug!(
        source = %source.display(),
        dest = %dest.display(),
        source_len,
        len,
        "compressed"
    );

    Ok(CompressedArtifact {
        path: dest.to_path_buf(),
        len,
        source_len,
    })
}
