//! Atomic output files

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// Run `write` against a temporary file next to `output` and move it into
/// place only if `write` succeeds. On failure `output` is left untouched.
pub fn write_atomically<T, E, F>(output: &Path, write: F) -> Result<T>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> std::result::Result<T, E>,
    E: Into<anyhow::Error>,
{
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;

    let value = {
        let mut writer = BufWriter::new(temp.as_file_mut());
        let value = write(&mut writer).map_err(Into::into)?;
        writer
            .flush()
            .with_context(|| format!("Failed to write output: {:?}", output))?;
        value
    };

    temp.persist(output)
        .map_err(|err| err.error)
        .with_context(|| format!("Failed to create output file: {:?}", output))?;
    Ok(value)
}
