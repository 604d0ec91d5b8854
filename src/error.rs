//! Error kinds that abort a comparison run.
//!
//! Plumbing code returns `anyhow::Result`; these kinds are wrapped inside it
//! so callers (and tests) can still tell a bad configuration from a broken
//! external tool with `downcast_ref`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    /// Invalid combination of command line settings, detected before any
    /// external program runs.
    #[error("configuration error: {0}")]
    Config(String),

    /// An input file could not be read.
    #[error("could not read input {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A collaborator exited non-zero or broke its output contract.
    /// `output` holds whatever the process printed.
    #[error("{tool} encountered an error:\n{output}")]
    ExternalTool { tool: String, output: String },
}

impl HarnessError {
    pub fn config(msg: impl Into<String>) -> Self {
        HarnessError::Config(msg.into())
    }

    pub fn tool(tool: impl Into<String>, output: impl Into<String>) -> Self {
        HarnessError::ExternalTool {
            tool: tool.into(),
            output: output.into(),
        }
    }
}
