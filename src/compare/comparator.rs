//! @ai:module:intent Invoke the external image comparator on a result image
//! @ai:module:layer infrastructure
//! @ai:module:public_api Comparator, ExternalComparator, ERRORS_FILE, ERROR_MAPS
//! @ai:module:stateless true

use crate::config::ToolConfig;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Error log written by the comparator into its working directory.
pub const ERRORS_FILE: &str = "errors.json";

/// Error maps written by the comparator next to `errors.json`.
pub const ERROR_MAPS: [&str; 3] = ["mse_map.png", "rmse_map.png", "ssim_map.png"];

/// @ai:intent Trait for comparing a result image against its reference
pub trait Comparator {
    /// @ai:intent Produce `errors.json` and the error maps inside `work_dir`
    fn compare(&self, reference: &Path, candidate: &Path, work_dir: &Path) -> Result<()>;
}

/// @ai:intent Runs the installed `compare` executable, after an optional `exr2png` conversion
pub struct ExternalComparator {
    compare: PathBuf,
    exr2png: Option<PathBuf>,
}

impl ExternalComparator {
    /// @ai:effects pure
    pub fn new(compare: PathBuf, exr2png: Option<PathBuf>) -> Self {
        Self { compare, exr2png }
    }

    /// @ai:intent Comparator using the executables of the workspace settings
    /// @ai:effects env
    pub fn from_tools(tools: &ToolConfig) -> Self {
        Self::new(tools.compare_exec(), Some(tools.exr2png_exec()))
    }

    /// @ai:intent Run a tool to completion, turning a non-zero exit into an error
    /// @ai:effects io
    fn run(command: &mut Command, tool: &Path) -> Result<()> {
        let output = command.output()?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!("{} stderr: {}", tool.display(), stderr.trim());
        }
        Err(Error::ToolFailed {
            tool: tool.display().to_string(),
            status: output.status.to_string(),
        })
    }
}

impl Comparator for ExternalComparator {
    /// @ai:effects io, fs:write
    fn compare(&self, reference: &Path, candidate: &Path, work_dir: &Path) -> Result<()> {
        if let Some(exr2png) = &self.exr2png {
            if let Err(e) = Self::run(Command::new(exr2png).arg(candidate), exr2png) {
                tracing::warn!("PNG conversion of {} failed: {}", candidate.display(), e);
            }
        }

        Self::run(
            Command::new(&self.compare)
                .arg("--save-maps")
                .arg("--save-errors")
                .arg(reference)
                .arg(candidate)
                .current_dir(work_dir),
            &self.compare,
        )?;

        let errors = work_dir.join(ERRORS_FILE);
        if !errors.is_file() {
            return Err(Error::MissingOutput {
                tool: self.compare.display().to_string(),
                path: errors,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_executable_is_an_error() {
        let temp = TempDir::new().unwrap();
        let comparator = ExternalComparator::new(temp.path().join("no-such-compare"), None);
        let result = comparator.compare(
            &temp.path().join("ref.exr"),
            &temp.path().join("8_0.exr"),
            temp.path(),
        );
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_tool_reports_status() {
        let temp = TempDir::new().unwrap();
        let comparator = ExternalComparator::new(PathBuf::from("false"), None);
        let result = comparator.compare(Path::new("ref.exr"), Path::new("8_0.exr"), temp.path());
        assert!(matches!(result, Err(Error::ToolFailed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_tool_without_output_is_an_error() {
        let temp = TempDir::new().unwrap();
        let comparator = ExternalComparator::new(PathBuf::from("true"), None);
        let result = comparator.compare(Path::new("ref.exr"), Path::new("8_0.exr"), temp.path());
        assert!(matches!(result, Err(Error::MissingOutput { .. })));
    }
}
