//! A tiny interactive shell built around command resolution and process
//! execution.
//!
//! The shell knows three builtins — `cd`, `dirs` and `exec` — and runs any
//! other command by locating an executable on `PATH` and spawning it as a
//! child process that the shell waits for. The `exec` builtin instead
//! replaces the shell's own process image, never returning on success.
//!
//! The pieces are exposed individually: [`EnvSnapshot`] is the environment
//! captured once at startup, [`resolve()`] maps typed command names to
//! executables, the [`exec`] module launches or replaces processes, and
//! [`Shell`] ties them together behind an interactive prompt.

mod builtin;
pub mod command;
pub mod env;
pub mod exec;
pub mod resolve;
mod shell;

pub use env::EnvSnapshot;
pub use resolve::resolve;
pub use shell::Shell;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Mutex, MutexGuard, OnceLock};

    /// Serializes tests that read or change the process working directory.
    pub(crate) fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX.get_or_init(|| Mutex::new(())).lock().unwrap()
    }
}
