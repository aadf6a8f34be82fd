//! Starpipe Command Chaining
//!
//! Runs Starlab-style simulation tools as a left-to-right pipeline: each
//! stage's parsed output becomes the next stage's standard input. The tools
//! themselves are black boxes that read a story on stdin and write zero or
//! more stories to stdout.
//!
//! # Core Concepts
//!
//! - [`CommandLine`]: validated argv, built from one string (naive
//!   whitespace tokenization, no shell quoting) or a pre-tokenized list
//! - [`CommandRunner`]: the external-process collaborator seam; the bundled
//!   [`ProcessRunner`] spawns real OS processes via tokio
//! - [`StoryChain`]: the pipeline driver, offering `from_single_command`,
//!   `apply_command`, and `from_command_list`
//!
//! A chain is strictly sequential: a stage's stdout is fully captured, its
//! exit status checked, and its output parsed before the next stage spawns.
//! Feeding a multi-snapshot result forward is ambiguous and rejected before
//! any process starts. Nothing is ever retried: a rerun of a stochastic
//! simulation would silently change results.
//!
//! # Example
//!
//! ```rust,no_run
//! use starpipe_chain::{CommandLine, StoryChain};
//!
//! # async fn demo() -> Result<(), starpipe_chain::ChainError> {
//! let commands: Vec<CommandLine> = vec![
//!     "makeking -w 1.5 -s 1454677882 -n 5 -i".parse()?,
//!     "makemass -i -l 0.1 -u 20 -s 1454677882".parse()?,
//! ];
//! let snaps = StoryChain::new().from_command_list(&commands).await?;
//! println!("{snaps}");
//! # Ok(())
//! # }
//! ```

mod chain;
mod command;
mod error;
mod runner;

pub use chain::StoryChain;
pub use command::CommandLine;
pub use error::ChainError;
pub use runner::{CommandRunner, ExitInfo, ProcessRunner, RunOutput, RunnerError};

pub use starpipe_parse::{parse_lines, parse_str, ParseError};
pub use starpipe_story::{Snapshots, Story};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
