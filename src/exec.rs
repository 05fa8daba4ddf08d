use crate::env::EnvSnapshot;
use crate::resolve::{self, ResolveError};
use std::convert::Infallible;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Failure to run an external command as a child process.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to start '{}': {}", .path.display(), .source)]
    Spawn {
        path: PathBuf,
        source: io::Error,
    },

    #[error("failed to wait for '{}': {}", .path.display(), .source)]
    Wait {
        path: PathBuf,
        source: io::Error,
    },
}

/// Run `argv` as a child process and block until it terminates.
///
/// The first element of `argv` is the command name as typed; it is resolved
/// on every call and the resolved path is what actually runs, while the
/// child still sees the typed name as its own `argv[0]`. The child gets the
/// snapshot environment, the argument tail unchanged, and inherited stdio.
///
/// The child's exit status is deliberately discarded: the shell keeps
/// running with its own exit status whatever the command did.
pub fn launch(env: &EnvSnapshot, argv: &[String]) -> Result<(), LaunchError> {
    let path = resolve::resolve(env, &argv[0])?;
    let mut child = command_for(&path, argv, env)
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            path: path.clone(),
            source,
        })?;
    let status = child.wait().map_err(|source| LaunchError::Wait {
        path: path.clone(),
        source,
    })?;
    log::debug!("'{}' exited with {}", argv[0], status);
    Ok(())
}

/// Replace the current process image with `argv`, without forking.
///
/// On success this never returns: the process stops being the shell and
/// becomes the target program, keeping its PID. The [`Infallible`] success
/// type leaves callers only the failure branch to handle.
///
/// A resolution failure is returned and the shell goes on. A failure of the
/// replacement itself is terminal: once the swap has been issued the process
/// must not fall back to running shell logic, so the OS error is reported
/// and the process exits with it.
pub fn replace(env: &EnvSnapshot, argv: &[String]) -> Result<Infallible, ResolveError> {
    let path = resolve::resolve(env, &argv[0])?;
    let err = exec_in_place(command_for(&path, argv, env));
    // Only reachable when the image swap failed underneath us.
    log::error!("image replacement with '{}' failed: {}", path.display(), err);
    eprintln!("exec: {}: {}", path.display(), err);
    std::process::exit(err.raw_os_error().unwrap_or(1));
}

/// Build the command for a resolved executable: the typed name stays the
/// child's `argv[0]`, the argument tail is passed unchanged, and the child
/// sees exactly the captured environment.
fn command_for(path: &Path, argv: &[String], env: &EnvSnapshot) -> Command {
    let mut cmd = Command::new(path);
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.arg0(&argv[0]);
    }
    cmd.args(&argv[1..]);
    cmd.env_clear();
    cmd.envs(env.iter());
    cmd
}

#[cfg(unix)]
fn exec_in_place(mut cmd: Command) -> io::Error {
    use std::os::unix::process::CommandExt;
    cmd.exec()
}

#[cfg(not(unix))]
fn exec_in_place(mut cmd: Command) -> io::Error {
    // No in-place replacement outside unix: run the command and leave with
    // its status, the closest observable behavior.
    match cmd.status() {
        Ok(status) => std::process::exit(status.code().unwrap_or(0)),
        Err(e) => e,
    }
}
