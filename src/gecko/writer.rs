//! Compressed, atomically-renamed profile output.
//!
//! The document is serialized compact, gzipped, and written to a temporary
//! file in the destination directory before being renamed into place, so a
//! failed conversion never leaves a partial file behind. The gzip header
//! carries no timestamp, so identical profiles produce identical bytes.

use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::NamedTempFile;

use crate::domain::ConvertError;
use crate::gecko::schema::GeckoProfile;

/// Serialize and gzip the profile into an arbitrary writer.
pub fn write_gzipped<W: Write>(profile: &GeckoProfile, writer: W) -> Result<(), ConvertError> {
    let json = serde_json::to_vec(profile)?;
    let mut encoder = GzEncoder::new(writer, Compression::default());
    encoder.write_all(&json).map_err(ConvertError::OutputWrite)?;
    encoder.finish().map(|_| ()).map_err(ConvertError::OutputWrite)
}

/// Write the profile to `output`, atomically.
pub fn write_profile(profile: &GeckoProfile, output: &Path) -> Result<(), ConvertError> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let tmp = NamedTempFile::new_in(dir).map_err(ConvertError::OutputWrite)?;
    write_gzipped(profile, tmp.as_file())?;
    tmp.persist(output).map_err(|e| ConvertError::OutputWrite(e.error))?;
    Ok(())
}
