//! Input validation for the merge command.

use bstr::BString;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::errors::{MergeError, Result};

/// Validate that a file exists
///
/// # Arguments
/// * `path` - Path to validate
/// * `description` - Human-readable description of the file (e.g., "Input BAM")
///
/// # Errors
/// Returns an error if the file does not exist
///
/// # Example
/// ```
/// use bammerge_lib::validation::validate_file_exists;
///
/// let result = validate_file_exists("/nonexistent/file.bam", "Input BAM");
/// assert!(result.is_err());
/// ```
pub fn validate_file_exists<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        return Err(MergeError::InvalidFileFormat {
            file_type: description.to_string(),
            path: path_ref.display().to_string(),
            reason: "File does not exist".to_string(),
        });
    }
    Ok(())
}

/// Validate that no input path is given twice.
///
/// Paths are compared as given and, when they resolve, by canonical path, so
/// `a.bam` and `./a.bam` count as the same input.
///
/// # Errors
/// Returns [`MergeError::DuplicateStream`] naming the first repeated path.
pub fn validate_distinct_inputs<P: AsRef<Path>>(paths: &[P]) -> Result<()> {
    let mut seen: HashSet<PathBuf> = HashSet::with_capacity(paths.len());
    for path in paths {
        let path_ref = path.as_ref();
        let key = path_ref.canonicalize().unwrap_or_else(|_| path_ref.to_path_buf());
        if !seen.insert(key) {
            return Err(MergeError::DuplicateStream {
                stream: BString::from(path_ref.to_string_lossy().as_bytes()),
            });
        }
    }
    Ok(())
}

/// Validate that the output does not overwrite one of the inputs.
///
/// # Errors
/// Returns an error if `output` resolves to the same file as any input.
pub fn validate_output_not_input<P: AsRef<Path>, Q: AsRef<Path>>(
    output: Q,
    inputs: &[P],
) -> Result<()> {
    let output_ref = output.as_ref();
    let Ok(output_canonical) = output_ref.canonicalize() else {
        // Output does not exist yet
        return Ok(());
    };

    for input in inputs {
        if input.as_ref().canonicalize().is_ok_and(|p| p == output_canonical) {
            return Err(MergeError::InvalidFileFormat {
                file_type: "Output BAM".to_string(),
                path: output_ref.display().to_string(),
                reason: "Output would overwrite an input".to_string(),
            });
        }
    }
    Ok(())
}
