//! Testing utilities for the starpipe workspace
//!
//! Shared fixtures in real Starlab output shape, plus a scripted
//! [`CommandRunner`] double that replays canned outputs and records every
//! invocation (argv and exact stdin text) for assertions.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use starpipe_chain::{CommandRunner, RunOutput, RunnerError};
use std::collections::HashMap;

/// One recorded call to the scripted runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub argv: Vec<String>,
    pub stdin: Option<String>,
}

/// Replay double for [`CommandRunner`].
///
/// Maps a program name to a canned [`RunOutput`], returned on every call to
/// that program. Unknown programs fail the way a real spawn of a missing
/// binary does. Every call is recorded in order.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    outputs: Mutex<HashMap<String, RunOutput>>,
    invocations: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful run of `program` printing `stdout`.
    #[must_use]
    pub fn respond(self, program: impl Into<String>, stdout: impl Into<String>) -> Self {
        self.outputs
            .lock()
            .insert(program.into(), RunOutput::success(stdout));
        self
    }

    /// Script an arbitrary output (exit codes, stderr) for `program`.
    #[must_use]
    pub fn respond_with(self, program: impl Into<String>, output: RunOutput) -> Self {
        self.outputs.lock().insert(program.into(), output);
        self
    }

    /// Everything this runner was asked to execute, in order.
    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, argv: &[String], stdin: Option<&str>) -> Result<RunOutput, RunnerError> {
        self.invocations.lock().push(Invocation {
            argv: argv.to_vec(),
            stdin: stdin.map(str::to_string),
        });
        let program = argv.first().cloned().unwrap_or_default();
        self.outputs
            .lock()
            .get(&program)
            .cloned()
            .ok_or_else(|| RunnerError::Launch {
                program,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not scripted"),
            })
    }
}

/// The minimal single-section scenario: a `Dynamics` story with `N = 5`.
#[must_use]
pub fn dynamics_fixture() -> String {
    "(Dynamics\n  N = 5\n)Dynamics\n".to_string()
}

/// A `makeking`-shaped snapshot: `Particle` root holding `Log` (with a
/// volatile ` ===>` timestamp), `Dynamics`, `Hydro`, `Star`, and one nested
/// `Particle` per star.
#[must_use]
pub fn king_fixture() -> String {
    let mut text = String::new();
    text.push_str("(Particle\n");
    text.push_str("  N = 2\n");
    text.push_str("(Log\n");
    text.push_str(" ===>  Fri Feb  5 12:31:22 2016\n");
    text.push_str("  initial_mass = 1\n");
    text.push_str("  seed = 1454677882\n");
    text.push_str(")Log\n");
    text.push_str("(Dynamics\n");
    text.push_str("  system_time  =  0\n");
    text.push_str("  m  =  1\n");
    text.push_str("  r  =  0 0 0\n");
    text.push_str("  v  =  0 0 0\n");
    text.push_str(")Dynamics\n");
    text.push_str("(Hydro\n)Hydro\n");
    text.push_str("(Star\n)Star\n");
    for i in 0..2 {
        text.push_str("(Particle\n");
        text.push_str(&format!("  i = {i}\n"));
        text.push_str("(Log\n)Log\n");
        text.push_str("(Dynamics\n");
        text.push_str("  m  =  0.5\n");
        text.push_str(&format!("  r  =  0.1 0.{i} 0\n"));
        text.push_str("  v  =  0 0 0.3\n");
        text.push_str(")Dynamics\n");
        text.push_str("(Hydro\n)Hydro\n");
        text.push_str("(Star\n)Star\n");
        text.push_str(")Particle\n");
    }
    text.push_str(")Particle\n");
    text
}

/// A `kira`-shaped stream: `count` concatenated top-level snapshots with
/// advancing `system_time`, two time units apart.
#[must_use]
pub fn kira_stream(count: usize) -> String {
    (0..count)
        .map(|i| {
            format!(
                "(Particle\n  N = 2\n(Dynamics\n  system_time  =  {}\n)Dynamics\n)Particle\n",
                i * 2
            )
        })
        .collect()
}
