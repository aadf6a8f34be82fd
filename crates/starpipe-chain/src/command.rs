//! Command-line tokenization
//!
//! A command reaches the chain either as one string or as pre-tokenized
//! argv. String tokenization is naive whitespace splitting with no shell
//! quoting, so arguments containing spaces are not representable. That
//! matches how the simulation tools are invoked in practice
//! (`makeking -w 1.5 -s 1454677882 -n 5 -i`).

use crate::error::ChainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated, non-empty argument vector for one external command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLine {
    argv: Vec<String>,
}

impl CommandLine {
    /// Build from pre-tokenized argv.
    ///
    /// # Errors
    /// `ChainError::EmptyCommand` if the vector is empty or the program
    /// name is blank.
    pub fn new(argv: Vec<String>) -> Result<Self, ChainError> {
        match argv.first() {
            Some(program) if !program.trim().is_empty() => Ok(Self { argv }),
            _ => Err(ChainError::EmptyCommand),
        }
    }

    /// Program name (first argv entry)
    #[inline]
    #[must_use]
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Full argument vector, program included
    #[inline]
    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Arguments after the program name
    #[inline]
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }
}

impl FromStr for CommandLine {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.split_whitespace().map(str::to_string).collect())
    }
}

impl TryFrom<Vec<String>> for CommandLine {
    type Error = ChainError;

    fn try_from(argv: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(argv)
    }
}

impl TryFrom<&[&str]> for CommandLine {
    type Error = ChainError;

    fn try_from(argv: &[&str]) -> Result<Self, Self::Error> {
        Self::new(argv.iter().map(|s| s.to_string()).collect())
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_whitespace() {
        let cmd: CommandLine = "makeking -w 1.5 -s 1454677882 -n 5 -i".parse().unwrap();
        assert_eq!(cmd.program(), "makeking");
        assert_eq!(cmd.args().len(), 7);
        assert_eq!(cmd.args()[1], "1.5");
    }

    #[test]
    fn string_and_list_forms_agree() {
        let from_str: CommandLine = "kira -t 10 -d 1 -D 2".parse().unwrap();
        let from_list =
            CommandLine::try_from(["kira", "-t", "10", "-d", "1", "-D", "2"].as_slice()).unwrap();
        assert_eq!(from_str, from_list);
    }

    #[test]
    fn collapses_repeated_whitespace() {
        let cmd: CommandLine = "  cat   -n ".parse().unwrap();
        assert_eq!(cmd.argv(), ["cat", "-n"]);
    }

    #[test]
    fn rejects_empty_forms() {
        assert!(matches!(
            "".parse::<CommandLine>(),
            Err(ChainError::EmptyCommand)
        ));
        assert!(matches!(
            "   ".parse::<CommandLine>(),
            Err(ChainError::EmptyCommand)
        ));
        assert!(matches!(
            CommandLine::new(Vec::new()),
            Err(ChainError::EmptyCommand)
        ));
    }

    #[test]
    fn display_rejoins_argv() {
        let cmd: CommandLine = "makemass -i -l 0.1".parse().unwrap();
        assert_eq!(cmd.to_string(), "makemass -i -l 0.1");
    }
}
