use crate::env::EnvSnapshot;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure,
/// mirroring the convention used by POSIX shells.
pub type ExitCode = i32;

/// Object-safe trait for any command the shell can dispatch.
///
/// Implemented by built-ins via a blanket impl and by the external command
/// fallback.
pub trait ExecutableCommand {
    /// Executes the command, writing user-facing output to `stdout`.
    fn execute(self: Box<Self>, env: &EnvSnapshot, stdout: &mut dyn Write) -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize `name`; the dispatch
/// chain then moves on to the next registered factory.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>>;
}
