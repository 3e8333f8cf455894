//! Write-to-temp-then-rename file replacement.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use tempfile::NamedTempFile;

use crate::{Result, error::Error};

/// Replace `path` with whatever `write` produces.
///
/// The content goes to a temporary file in the destination directory, which
/// is synced and then renamed over `path`. On any failure the temporary file
/// is removed and the existing `path` is untouched.
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&File>) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = NamedTempFile::new_in(dir).map_err(|source| Error::Io {
        operation: format!("create temporary file in {dir:?}"),
        source,
    })?;

    {
        let mut writer = BufWriter::new(temp.as_file());
        write(&mut writer)?;
        writer.flush().map_err(|source| Error::Io {
            operation: format!("flush temporary file for {path:?}"),
            source,
        })?;
    }
    temp.as_file().sync_all().map_err(|source| Error::Io {
        operation: format!("sync temporary file for {path:?}"),
        source,
    })?;

    temp.persist(path).map_err(|e| Error::Io {
        operation: format!("replace {path:?}"),
        source: e.error,
    })?;
    Ok(())
}
