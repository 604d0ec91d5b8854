//! Resumable pipeline stages.
//!
//! A stage owns one output artifact. It only starts when that artifact is
//! absent, and it only succeeds when the artifact exists afterwards.

use crate::error::HarnessError;
use anyhow::Result;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageState {
    NotStarted,
    Running,
    Succeeded { elapsed_seconds: f64 },
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageOutcome {
    /// The artifact was already there; nothing ran.
    Skipped,
    Succeeded { elapsed_seconds: f64 },
}

#[derive(Debug)]
pub struct Stage {
    tool: String,
    artifact: PathBuf,
    state: StageState,
}

impl Stage {
    pub fn new(tool: impl Into<String>, artifact: impl Into<PathBuf>) -> Self {
        Stage {
            tool: tool.into(),
            artifact: artifact.into(),
            state: StageState::NotStarted,
        }
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    fn settle(&mut self, state: StageState) {
        self.state = state;
        debug!("{} stage: {:?}", self.tool, self.state());
    }

    /// Run `work` unless the artifact already exists, timing it by wall clock.
    ///
    /// `work` returns the tool's captured output, which is attached to the
    /// error if the artifact is missing afterwards.
    pub fn run<F>(&mut self, work: F) -> Result<StageOutcome>
    where
        F: FnOnce() -> Result<String>,
    {
        if self.artifact.is_file() {
            info!("{}: {} already exists, skipping", self.tool, self.artifact.display());
            return Ok(StageOutcome::Skipped);
        }
        self.settle(StageState::Running);
        let start = Instant::now();

        let output = match work() {
            Ok(output) => output,
            Err(e) => {
                self.settle(StageState::Failed);
                return Err(e);
            }
        };
        if !self.artifact.is_file() {
            self.settle(StageState::Failed);
            return Err(HarnessError::tool(
                &self.tool,
                format!("expected output {} was not created\n{output}", self.artifact.display()),
            )
            .into());
        }

        let elapsed_seconds = start.elapsed().as_secs_f64();
        self.settle(StageState::Succeeded { elapsed_seconds });
        Ok(StageOutcome::Succeeded { elapsed_seconds })
    }
}
