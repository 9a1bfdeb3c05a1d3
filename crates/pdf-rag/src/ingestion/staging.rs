//! Scoped temp staging for parser input

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::Result;

/// An uploaded blob staged to disk for parsers that want a file path.
///
/// The file name carries a random suffix, so concurrent uploads of
/// same-named files never collide. The file is removed when the guard
/// drops, whichever way the parse exits.
pub struct ScopedStaging {
    file: NamedTempFile,
}

impl ScopedStaging {
    /// Stage a blob into a fresh temp file
    pub fn write(data: &[u8]) -> Result<Self> {
        let mut file = tempfile::Builder::new().prefix("ingest-").tempfile()?;
        file.write_all(data)?;
        file.flush()?;
        Ok(Self { file })
    }

    /// Path of the staged file, valid until the guard drops
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
