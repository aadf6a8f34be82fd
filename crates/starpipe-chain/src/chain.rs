//! Sequential pipeline driver

use crate::command::CommandLine;
use crate::error::ChainError;
use crate::runner::{CommandRunner, ProcessRunner};
use starpipe_parse::parse_str;
use starpipe_story::{Snapshots, Story};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Drives external simulation commands as a left-to-right pipeline.
///
/// Generic over the [`CommandRunner`] collaborator; production code uses
/// the default [`ProcessRunner`], tests substitute a scripted double. The
/// chain holds no mutable state, so independent chains can run in separate
/// tasks with no coordination.
#[derive(Debug, Clone, Default)]
pub struct StoryChain<R = ProcessRunner> {
    runner: R,
}

impl StoryChain<ProcessRunner> {
    /// Chain over real OS processes with no time limit
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            runner: ProcessRunner::new(),
        }
    }

    /// Chain over real OS processes, killing any stage exceeding `timeout`
    #[inline]
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            runner: ProcessRunner::with_timeout(timeout),
        }
    }
}

impl<R: CommandRunner> StoryChain<R> {
    /// Chain over a caller-supplied runner
    #[inline]
    #[must_use]
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    /// The runner collaborator
    #[inline]
    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run one command with no input and parse everything it printed.
    ///
    /// # Errors
    /// Launch/exit failures surface as [`ChainError::Runner`] or
    /// [`ChainError::CommandFailed`]; malformed output as
    /// [`ChainError::Parse`]. Exit status is checked before any parse
    /// attempt, so garbage from a failed process is never interpreted.
    pub async fn from_single_command(
        &self,
        command: &CommandLine,
    ) -> Result<Snapshots, ChainError> {
        self.run_stage(command, None).await
    }

    /// Continue a simulation: serialize `story`, feed it to `command` on
    /// stdin, and parse what comes back.
    ///
    /// The input story is never mutated; evolution happens entirely inside
    /// the external process.
    ///
    /// # Errors
    /// Same contract as [`StoryChain::from_single_command`].
    pub async fn apply_command(
        &self,
        story: &Story,
        command: &CommandLine,
    ) -> Result<Snapshots, ChainError> {
        let input = story.serialize();
        self.run_stage(command, Some(&input)).await
    }

    /// Run an ordered command list as a pipeline.
    ///
    /// The first command runs with no input; every later stage requires the
    /// previous stage to have produced exactly one snapshot and receives it
    /// on stdin. The ambiguity check happens before the stage spawns.
    ///
    /// # Errors
    /// - `ChainError::EmptyChain` for an empty list
    /// - `ChainError::AmbiguousContinuation` when a continuation stage
    ///   follows a zero- or multi-snapshot result
    /// - otherwise the contract of [`StoryChain::from_single_command`]
    pub async fn from_command_list(
        &self,
        commands: &[CommandLine],
    ) -> Result<Snapshots, ChainError> {
        let (first, rest) = commands.split_first().ok_or(ChainError::EmptyChain)?;
        let mut current = self.from_single_command(first).await?;
        for (offset, command) in rest.iter().enumerate() {
            let stage = offset + 1;
            let story = current
                .single()
                .ok_or_else(|| ChainError::AmbiguousContinuation {
                    stage,
                    snapshots: current.len(),
                })?;
            current = self.apply_command(story, command).await?;
        }
        Ok(current)
    }

    async fn run_stage(
        &self,
        command: &CommandLine,
        input: Option<&str>,
    ) -> Result<Snapshots, ChainError> {
        info!(command = %command, has_input = input.is_some(), "running stage");
        let output = self.runner.run(command.argv(), input).await?;
        if !output.status.success() {
            return Err(ChainError::CommandFailed {
                program: command.program().to_string(),
                code: output.status.code(),
                stderr: output.stderr,
            });
        }
        if !output.stderr.is_empty() {
            warn!(command = %command, stderr = %output.stderr.trim_end(), "stage wrote to stderr");
        }
        let snaps = parse_str(&output.stdout)?;
        debug!(command = %command, snapshots = snaps.len(), "stage complete");
        Ok(snaps)
    }
}
