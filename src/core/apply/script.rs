//! Shell script output for a validated batch.

use super::ApplyMode;
use crate::core::resolver::{BatchPlan, RenameOperation};
use crate::error::ApplyError;
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Path argument meaning standard output
pub const STDOUT_PATH: &str = "-";

/// Writes one shell command per rename.
///
/// - `Move`: `mv [ARGS] OLD NEW`
/// - `Symlink`: `ln -s [ARGS] OLDNAME NEW`, the target relative to the link
/// - `Hardlink`: `ln [ARGS] OLD NEW`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptWriter {
    mode: ApplyMode,
    command: String,
    args: Vec<String>,
}

impl ScriptWriter {
    /// Writer with the default command and arguments for `mode`
    pub fn new(mode: ApplyMode) -> Self {
        let (command, args): (&str, &[&str]) = match mode {
            ApplyMode::Move => ("mv", &[]),
            ApplyMode::Symlink => ("ln", &["-s"]),
            ApplyMode::Hardlink => ("ln", &[]),
        };
        Self {
            mode,
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Replace the default arguments
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn mode(&self) -> ApplyMode {
        self.mode
    }

    /// The command line for one operation
    pub fn line(&self, op: &RenameOperation) -> String {
        let target = match self.mode {
            ApplyMode::Symlink => op.source_file_name(),
            ApplyMode::Move | ApplyMode::Hardlink => op.source.as_path(),
        };

        let mut words = Vec::with_capacity(self.args.len() + 3);
        words.push(shell_quote(&self.command).into_owned());
        words.extend(self.args.iter().map(|a| shell_quote(a).into_owned()));
        words.push(shell_quote(&target.to_string_lossy()).into_owned());
        words.push(shell_quote(&op.destination.to_string_lossy()).into_owned());
        words.join(" ")
    }

    /// Write a line per operation, in execution order
    pub fn write_all<W: Write>(&self, plan: &BatchPlan, mut out: W) -> io::Result<()> {
        for op in plan.operations() {
            writeln!(out, "{}", self.line(op))?;
        }
        out.flush()
    }

    /// Write the script to `path`, or to standard output for `-`
    pub fn write_to(&self, plan: &BatchPlan, path: &Path) -> Result<(), ApplyError> {
        let script_error = |source: io::Error| ApplyError::Script {
            path: path.to_path_buf(),
            source,
        };

        debug!(
            "writing {} command(s) for {:?} to {:?}",
            plan.operations().len(),
            self.mode,
            path
        );

        if path == Path::new(STDOUT_PATH) {
            let stdout = io::stdout();
            self.write_all(plan, stdout.lock()).map_err(script_error)
        } else {
            let file = File::create(path).map_err(script_error)?;
            self.write_all(plan, BufWriter::new(file)).map_err(script_error)
        }
    }
}

fn is_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c)
}

/// Quote `word` for a POSIX shell.
///
/// Words made only of safe characters pass through; anything else is
/// wrapped in single quotes, with embedded single quotes spliced in as
/// `'"'"'`.
pub fn shell_quote(word: &str) -> Cow<'_, str> {
    if word.is_empty() {
        return Cow::Borrowed("''");
    }
    if word.chars().all(is_safe) {
        return Cow::Borrowed(word);
    }
    Cow::Owned(format!("'{}'", word.replace('\'', "'\"'\"'")))
}
