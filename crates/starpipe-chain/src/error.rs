//! Chain error types
//!
//! Three failure families stay distinct: transport/process failures
//! ([`RunnerError`], non-zero exits), parse failures ([`ParseError`]), and
//! chain-shape failures (empty input, ambiguous continuation). All are
//! terminal for the operation that raised them; the chain never retries.

use crate::runner::RunnerError;
use starpipe_parse::ParseError;

/// Errors raised while running a command chain
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// A command string or argv list held no program name
    #[error("empty command")]
    EmptyCommand,

    /// `from_command_list` was called with no commands
    #[error("empty command list")]
    EmptyChain,

    /// The runner could not launch or talk to the process
    #[error(transparent)]
    Runner(#[from] RunnerError),

    /// The process ran but exited unsuccessfully
    #[error("command `{program}` failed with exit code {code:?}: {stderr}")]
    CommandFailed {
        /// Program that failed
        program: String,
        /// Exit code, `None` when killed by a signal
        code: Option<i32>,
        /// Captured standard error text
        stderr: String,
    },

    /// The captured stdout was not a well-formed story stream
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A stage needed exactly one snapshot to continue but the previous
    /// stage produced zero or several; picking one silently is disallowed
    #[error(
        "stage {stage} needs exactly one snapshot to continue, previous stage produced {snapshots}"
    )]
    AmbiguousContinuation {
        /// Zero-based index of the stage that could not start
        stage: usize,
        /// Snapshot count the previous stage produced
        snapshots: usize,
    },
}
