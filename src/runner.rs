//! Blocking invocation of external programs.

use crate::error::HarnessError;
use log::debug;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;
use std::process::Command;

/// A command line for one collaborator, plus the name used in error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub tool: String,
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(tool: impl Into<String>, program: impl AsRef<OsStr>) -> Self {
        ToolCommand {
            tool: tool.into(),
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.as_os_str())
    }

    /// Value that follows `flag`, if present.
    #[cfg(test)]
    pub fn value_of(&self, flag: &str) -> Option<&OsStr> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(|a| a.as_os_str())
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for a in &self.args {
            write!(f, " {}", a.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Runs a command to completion and returns everything it printed.
///
/// A non-zero exit status must come back as `HarnessError::ExternalTool`
/// carrying the captured output.
pub trait ToolRunner {
    fn run(&mut self, cmd: &ToolCommand) -> Result<String, HarnessError>;
}

impl<T: ToolRunner + ?Sized> ToolRunner for &mut T {
    fn run(&mut self, cmd: &ToolCommand) -> Result<String, HarnessError> {
        (**self).run(cmd)
    }
}

/// Runs commands with `std::process::Command`, waiting for them to exit.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&mut self, cmd: &ToolCommand) -> Result<String, HarnessError> {
        debug!("Running: {cmd}");
        let output = Command::new(&cmd.program)
            .args(&cmd.args)
            .output()
            .map_err(|e| HarnessError::tool(&cmd.tool, format!("failed to start `{cmd}`: {e}")))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        if !output.status.success() {
            return Err(HarnessError::tool(&cmd.tool, text));
        }
        Ok(text)
    }
}
