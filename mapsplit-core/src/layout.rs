use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Where a run writes its output for a given source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPaths {
    /// `<source>.<ext>`: the single compressed artifact.
    pub final_path: PathBuf,
    /// `<source>.<ext>.parts`: container for split output.
    pub parts_dir: PathBuf,
    /// File name of `final_path`; prefix of every part file name.
    pub base_name: String,
}

impl OutputPaths {
    pub fn for_source(source: &Path, extension: &str) -> Self {
        let final_path = append_ext(source, extension);
        let parts_dir = append_ext(&final_path, "parts");
        let base_name = final_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            final_path,
            parts_dir,
            base_name,
        }
    }
}

// Path::with_extension would replace `.bsp`; we append instead.
fn append_ext(p: &Path, ext: &str) -> PathBuf {
    let mut s: OsString = p.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_rather_than_replaces() {
        let p = OutputPaths::for_source(Path::new("/srv/maps/de_dust2.bsp"), "bz2");
        assert_eq!(p.final_path, Path::new("/srv/maps/de_dust2.bsp.bz2"));
        assert_eq!(p.parts_dir, Path::new("/srv/maps/de_dust2.bsp.bz2.parts"));
        assert_eq!(p.base_name, "de_dust2.bsp.bz2");
    }

    #[test]
    fn relative_source() {
        let p = OutputPaths::for_source(Path::new("ctf_2fort.bsp"), "zst");
        assert_eq!(p.final_path, Path::new("ctf_2fort.bsp.zst"));
        assert_eq!(p.base_name, "ctf_2fort.bsp.zst");
    }
}
