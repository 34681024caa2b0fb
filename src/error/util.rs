//! Utility functions for error handling
//!
//! Helpers that attach the file path and purpose to IO failures.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{CardioError, Result};

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
///
/// # Errors
/// Returns an IO error describing the path and purpose if the file is absent,
/// is not a regular file, or cannot be opened.
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        return Err(io_error(
            io::ErrorKind::NotFound,
            format!("File not found: {} (needed for: {purpose})", path.display()),
        ));
    }

    if !path.is_file() {
        return Err(io_error(
            io::ErrorKind::InvalidInput,
            format!(
                "Path is not a file: {} (expected a file for: {purpose})",
                path.display()
            ),
        ));
    }

    fs::File::open(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => "Permission denied - check file permissions",
            _ => "Failed to open file",
        };
        io_error(
            e.kind(),
            format!("{context}: {} ({purpose}): {e}", path.display()),
        )
    })
}

/// Check that a directory exists and is readable
///
/// # Errors
/// Returns an IO error if the path is missing, not a directory, or unreadable.
pub fn validate_directory(path: &Path, purpose: &str) -> Result<()> {
    if !path.exists() {
        return Err(io_error(
            io::ErrorKind::NotFound,
            format!(
                "Directory not found: {} (needed for: {purpose})",
                path.display()
            ),
        ));
    }

    if !path.is_dir() {
        return Err(io_error(
            io::ErrorKind::InvalidInput,
            format!(
                "Path is not a directory: {} (expected a directory for: {purpose})",
                path.display()
            ),
        ));
    }

    fs::read_dir(path).map(|_| ()).map_err(|e| {
        io_error(
            e.kind(),
            format!("Failed to access directory {} ({purpose}): {e}", path.display()),
        )
    })
}

/// Safely read a file to string with rich error information
///
/// # Errors
/// Returns an IO error if the file cannot be opened or is not valid UTF-8.
pub fn safe_read_to_string(path: &Path, purpose: &str) -> Result<String> {
    let mut file = safe_open_file(path, purpose)?;

    let mut content = String::new();
    io::Read::read_to_string(&mut file, &mut content).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::InvalidData => "File contains invalid UTF-8 data",
            _ => "Failed to read file content",
        };
        io_error(
            e.kind(),
            format!("{context}: {} ({purpose}): {e}", path.display()),
        )
    })?;

    Ok(content)
}

fn io_error(kind: io::ErrorKind, message: String) -> CardioError {
    CardioError::Io(io::Error::new(kind, message))
}
