//! `Tools` backed by the host's `file`, `lipo`, `cmp` and `diff`

use super::{GroupFormats, Tools};
use crate::merge::{MergeError, MergeResult as Result};
use std::path::Path;
use std::process::{Command, Output};

/// Runs the real command line tools
#[derive(Debug, Clone)]
pub struct SystemTools {
    /// File-type inspector
    pub file: &'static str,
    /// Mach-O / archive combiner
    pub lipo: &'static str,
    /// Byte comparator
    pub cmp: &'static str,
    /// Line diff
    pub diff: &'static str,
}

impl Default for SystemTools {
    fn default() -> Self {
        Self {
            file: "file",
            lipo: "lipo",
            cmp: "cmp",
            diff: "diff",
        }
    }
}

impl SystemTools {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tools for SystemTools {
    fn describe_file(&self, path: &Path) -> Result<String> {
        let output = run(self.file, Command::new(self.file).arg("--brief").arg(path))?;
        if !output.status.success() {
            return Err(tool_failed(self.file, path, &output));
        }

        let description = String::from_utf8_lossy(&output.stdout);
        Ok(description
            .strip_suffix('\n')
            .unwrap_or(&description)
            .to_string())
    }

    fn combine(&self, first: &Path, second: &Path, output: &Path) -> Result<bool> {
        let status = Command::new(self.lipo)
            .arg("-create")
            .arg(first)
            .arg(second)
            .arg("-output")
            .arg(output)
            .status();

        match status {
            Ok(status) => Ok(status.success()),
            Err(e) => {
                // Without a combiner every binary pair falls back to a mismatch
                tracing::warn!(tool = self.lipo, error = %e, "combiner could not be launched");
                Ok(false)
            }
        }
    }

    fn identical(&self, first: &Path, second: &Path) -> Result<bool> {
        let output = run(self.cmp, Command::new(self.cmp).arg("-s").arg(first).arg(second))?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(tool_failed(self.cmp, first, &output)),
        }
    }

    fn diff_groups(&self, first: &Path, second: &Path, formats: &GroupFormats) -> Result<Vec<u8>> {
        let output = run(
            self.diff,
            Command::new(self.diff)
                .arg(format!("--unchanged-group-format={}", formats.unchanged))
                .arg(format!("--old-group-format={}", formats.old))
                .arg(format!("--new-group-format={}", formats.new))
                .arg(format!("--changed-group-format={}", formats.changed))
                .arg(first)
                .arg(second),
        )?;

        // 0: no differences, 1: differences, anything else is trouble
        match output.status.code() {
            Some(0) | Some(1) => Ok(output.stdout),
            _ => Err(tool_failed(self.diff, first, &output)),
        }
    }
}

fn run(tool: &'static str, command: &mut Command) -> Result<Output> {
    command
        .output()
        .map_err(|source| MergeError::ToolLaunch { tool, source })
}

fn tool_failed(tool: &'static str, path: &Path, output: &Output) -> MergeError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let reason = match stderr.trim() {
        "" => format!("exited with {}", output.status),
        msg => msg.to_string(),
    };
    MergeError::ToolFailed {
        tool,
        path: path.to_path_buf(),
        reason,
    }
}
