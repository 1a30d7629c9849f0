//! Input loading: read user-supplied document and PDF files into memory.
//!
//! Everything downstream works on byte buffers, so a batch can be built
//! equally from files on disk or from uploads held in memory. Checking
//! readability here turns a missing or protected file into a clear error
//! before any extraction starts.

use crate::error::PatdeckError;
use std::path::Path;
use tracing::{debug, warn};

/// PDF magic bytes.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF")
}

/// Read a local file, mapping the common failures to [`PatdeckError`].
pub fn read_input_file(path: &Path) -> Result<Vec<u8>, PatdeckError> {
    if !path.exists() {
        return Err(PatdeckError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::read(path) {
        Ok(bytes) => {
            debug!("Read {} bytes from {}", bytes.len(), path.display());
            Ok(bytes)
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(PatdeckError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(_) => Err(PatdeckError::FileNotFound {
            path: path.to_path_buf(),
        }),
    }
}

/// Read a candidate PDF. A file without the `%PDF` header is still
/// accepted (pdfium tolerates leading garbage) but logged.
pub fn read_pdf_file(path: &Path) -> Result<Vec<u8>, PatdeckError> {
    let bytes = read_input_file(path)?;
    if !looks_like_pdf(&bytes) {
        warn!("{} does not start with %PDF; keeping it as a candidate anyway", path.display());
    }
    Ok(bytes)
}

/// Display name for a path: its file name, else the whole path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
