//! Scratch file used as the commit payload.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{FlowError, Result};

/// Name of the generated file inside the resources directory.
pub const SCRATCH_FILE_NAME: &str = "file.txt";

/// Bytes written into a freshly created scratch file.
pub const SCRATCH_CONTENT: &[u8] = b"test";

/// A materialised scratch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchFile {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Bare file name, used as the repository path.
    pub name: String,
}

/// Create `SCRATCH_FILE_NAME` under `dir`, creating `dir` if needed.
///
/// An existing directory or file is not an error: an existing file is kept
/// as-is and only logged.
pub fn create_scratch_file(dir: &Path) -> Result<ScratchFile> {
    match fs::create_dir(dir) {
        Ok(()) => tracing::debug!(dir = %dir.display(), "Created scratch directory"),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            tracing::debug!(dir = %dir.display(), "Scratch directory already exists");
        }
        Err(e) => return Err(FlowError::io(dir, e)),
    }

    let path = dir.join(SCRATCH_FILE_NAME);
    match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(mut file) => {
            file.write_all(SCRATCH_CONTENT)
                .map_err(|e| FlowError::io(&path, e))?;
            tracing::info!(path = %path.display(), "Created scratch file");
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            tracing::warn!(path = %path.display(), "Scratch file already exists, reusing it");
        }
        Err(e) => return Err(FlowError::io(&path, e)),
    }

    let absolute = fs::canonicalize(&path).map_err(|e| FlowError::io(&path, e))?;
    Ok(ScratchFile {
        path: absolute,
        name: SCRATCH_FILE_NAME.to_string(),
    })
}

/// Read a file and return its bytes in standard base64.
pub fn encode_file_base64(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| FlowError::io(path, e))?;
    Ok(STANDARD.encode(bytes))
}

/// Remove a file; an absent file is not an error.
pub fn delete_file(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Deleted file");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "File does not exist, nothing to delete");
            Ok(())
        }
        Err(e) => Err(FlowError::io(path, e)),
    }
}
