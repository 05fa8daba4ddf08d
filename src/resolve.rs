use crate::env::EnvSnapshot;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to map a typed command token to an executable.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No search-path directory held an executable with this name.
    #[error("couldn't find any binary with name '{0}' in your PATH")]
    NotFound(String),
}

/// Map a command token to the path of the executable to run.
///
/// Tokens that already look like paths are passed through untouched, with no
/// existence or permission check; the execution attempt is where the OS
/// rejects a missing or unrunnable path. Everything else is searched for
/// across the `PATH` directories in listed order, and only a candidate the
/// current user may execute is returned. `PATH` is re-read from the snapshot
/// on every call and the result must not be cached across invocations: the
/// search path or the filesystem may change between commands.
///
/// A leading `~` is not expanded; the token reaches the OS as typed.
pub fn resolve(env: &EnvSnapshot, token: &str) -> Result<PathBuf, ResolveError> {
    if is_path_shaped(token) {
        return Ok(PathBuf::from(token));
    }
    let search = env.get("PATH").unwrap_or("");
    for dir in search.split(':').filter(|d| !d.is_empty()) {
        let candidate = Path::new(dir).join(token);
        if is_executable(&candidate) {
            log::debug!("resolved '{}' to {}", token, candidate.display());
            return Ok(candidate);
        }
    }
    Err(ResolveError::NotFound(token.to_string()))
}

/// A token the user already spelled as a path: an explicit anchor (`.`, `/`,
/// `~`) or any embedded separator. `bin/tool` is a relative path here, not a
/// search key.
fn is_path_shaped(token: &str) -> bool {
    token.starts_with(['.', '/', '~']) || token.contains('/')
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.is_file()
        && std::fs::metadata(path)
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
