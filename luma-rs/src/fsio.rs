//! File-system collaborators.
//!
//! The module resolver and the error formatter never touch `std::fs`
//! directly; they read through the [`FileReader`] seam so tests can supply
//! in-memory files and count reads.

use std::path::Path;

// ── FileReader ────────────────────────────────────────────────────────────────

/// Synchronous read capability.
///
/// `None` means "not found or unreadable" and is distinguishable from an
/// empty file, which reads as `Some("")`.
pub trait FileReader {
    fn read(&self, path: &Path) -> Option<String>;
}

/// [`FileReader`] over the real file system.
pub struct DiskReader;

impl FileReader for DiskReader {
    fn read(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }
}

// ── .env loading ──────────────────────────────────────────────────────────────

/// Load `.env` from the current working directory into the process
/// environment. Returns the number of variables set.
pub fn load_env() -> usize {
    load_env_from(Path::new(".env"))
}

/// Load a dotenv-style file: `KEY=VALUE` per line, `#` comments and blank
/// lines skipped, malformed lines ignored. Existing variables are
/// overwritten.
pub fn load_env_from(path: &Path) -> usize {
    let Some(contents) = DiskReader.read(path) else {
        return 0;
    };

    let mut count = 0;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        std::env::set_var(key, value.trim());
        count += 1;
    }
    count
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_missing_file_is_none() {
        assert!(DiskReader.read(Path::new("/no/such/file.lua")).is_none());
    }

    #[test]
    fn read_empty_file_is_some_empty() {
        let f = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(DiskReader.read(f.path()).as_deref(), Some(""));
    }

    #[test]
    fn read_returns_contents() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "return 42").unwrap();
        assert_eq!(DiskReader.read(f.path()).as_deref(), Some("return 42"));
    }

    #[test]
    fn load_env_sets_variables() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "# comment").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "LUMA_TEST_ENV_A=alpha").unwrap();
        writeln!(f, "LUMA_TEST_ENV_B = beta ").unwrap();
        writeln!(f, "not a pair").unwrap();

        let n = load_env_from(f.path());
        assert_eq!(n, 2);
        assert_eq!(std::env::var("LUMA_TEST_ENV_A").unwrap(), "alpha");
        assert_eq!(std::env::var("LUMA_TEST_ENV_B").unwrap(), "beta");
    }

    #[test]
    fn load_env_missing_file_is_zero() {
        assert_eq!(load_env_from(Path::new("/no/such/.env")), 0);
    }
}
