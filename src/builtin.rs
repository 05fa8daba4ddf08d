use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::EnvSnapshot;
use crate::exec;
use crate::shell::Factory;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::env as stdenv;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed
/// directly in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd".
    fn name() -> &'static str;

    /// Executes the command against the captured environment.
    ///
    /// Return value should follow shell conventions: 0 for success,
    /// non-zero for error.
    fn execute(self, env: &EnvSnapshot, stdout: &mut dyn Write) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, env: &EnvSnapshot, stdout: &mut dyn Write) -> Result<ExitCode> {
        match T::execute(*self, env, stdout) {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(stdout, "{}", e)?;
                Ok(1)
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, _env: &EnvSnapshot, stdout: &mut dyn Write) -> Result<ExitCode> {
        stdout.write_all(self.output.as_bytes())?;
        Ok(if self.is_error { 1 } else { 0 })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

#[derive(FromArgs)]
/// Change the shell working directory.
/// If no target is provided, changes to the directory named by HOME.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; defaults to $HOME when omitted.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, env: &EnvSnapshot, _stdout: &mut dyn Write) -> Result<ExitCode> {
        let target = match &self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => match env.get("HOME") {
                Some(home) => PathBuf::from(home),
                None => return Err(anyhow::anyhow!("cd: no target and HOME not set")),
            },
        };
        stdenv::set_current_dir(&target)
            .with_context(|| format!("cd: can't chdir to {}", target.display()))?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Display the shell working directory.
pub struct Dirs {}

impl BuiltinCommand for Dirs {
    fn name() -> &'static str {
        "dirs"
    }

    fn execute(self, _env: &EnvSnapshot, stdout: &mut dyn Write) -> Result<ExitCode> {
        let cwd = stdenv::current_dir().context("dirs: can't read the working directory")?;
        writeln!(stdout, "{}", cwd.display())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Replace the shell with a given command.
pub struct Exec {
    #[argh(positional, greedy)]
    /// command to become, followed by its arguments.
    pub command: Vec<String>,
}

impl BuiltinCommand for Exec {
    fn name() -> &'static str {
        "exec"
    }

    fn execute(self, env: &EnvSnapshot, stdout: &mut dyn Write) -> Result<ExitCode> {
        if self.command.is_empty() {
            writeln!(stdout, "exec: missing command")?;
            return Ok(1);
        }
        // Never returns on success: the process becomes the target program.
        match exec::replace(env, &self.command) {
            Ok(never) => match never {},
            Err(e) => {
                writeln!(stdout, "{}", e)?;
                Ok(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::lock_current_dir;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn make_unique_temp_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let p = stdenv::temp_dir().join(format!(
            "tsh_builtin_{}_{}_{}",
            tag,
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    fn empty_env() -> EnvSnapshot {
        EnvSnapshot::from_pairs([("PATH", "")])
    }

    #[test]
    fn cd_to_absolute_path() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir("cd_abs");
        let canonical = fs::canonicalize(&temp).expect("canonicalize failed");
        let orig = stdenv::current_dir().unwrap();

        let cmd = Cd {
            target: Some(canonical.to_string_lossy().to_string()),
        };
        let mut out: Vec<u8> = Vec::new();
        let res = cmd.execute(&empty_env(), &mut out);

        assert!(res.is_ok());
        let new_cwd = fs::canonicalize(stdenv::current_dir().unwrap()).unwrap();
        assert_eq!(new_cwd, canonical);

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
        let _ = fs::remove_dir_all(temp);
    }

    #[test]
    fn cd_defaults_to_home() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir("cd_home");
        let canonical = fs::canonicalize(&temp).expect("canonicalize failed");
        let orig = stdenv::current_dir().unwrap();

        let env = EnvSnapshot::from_pairs([("HOME", canonical.to_string_lossy().to_string())]);
        let cmd = Cd { target: None };
        let mut out: Vec<u8> = Vec::new();
        let res = cmd.execute(&env, &mut out);

        assert!(res.is_ok());
        let new_cwd = fs::canonicalize(stdenv::current_dir().unwrap()).unwrap();
        assert_eq!(new_cwd, canonical);

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
        let _ = fs::remove_dir_all(temp);
    }

    #[test]
    fn cd_nonexistent_path_errors() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();

        let name = format!("tsh_no_such_dir_{}", std::process::id());
        let cmd = Cd { target: Some(name) };
        let mut out: Vec<u8> = Vec::new();
        let res = cmd.execute(&empty_env(), &mut out);

        assert!(res.is_err());
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }

    #[test]
    fn cd_without_home_errors() {
        let _lock = lock_current_dir();
        let cmd = Cd { target: None };
        let mut out: Vec<u8> = Vec::new();
        let res = cmd.execute(&empty_env(), &mut out);
        assert!(res.is_err());
    }

    #[test]
    fn dirs_prints_the_working_directory() {
        let _lock = lock_current_dir();
        let cwd = stdenv::current_dir().unwrap();

        let cmd = Dirs {};
        let mut out: Vec<u8> = Vec::new();
        let res = cmd.execute(&empty_env(), &mut out);

        assert!(res.is_ok());
        let s = String::from_utf8(out).unwrap();
        assert_eq!(s, format!("{}\n", cwd.display()));
    }

    #[test]
    fn exec_without_operands_reports_and_returns() {
        let cmd = Exec { command: vec![] };
        let mut out: Vec<u8> = Vec::new();
        let res = cmd.execute(&empty_env(), &mut out);

        assert_eq!(res.unwrap(), 1);
        let s = String::from_utf8(out).unwrap();
        assert!(s.contains("exec: missing command"));
    }

    #[test]
    fn exec_unknown_command_reports_and_survives() {
        let cmd = Exec {
            command: vec!["frobnicate".to_string()],
        };
        let mut out: Vec<u8> = Vec::new();
        let res = cmd.execute(&empty_env(), &mut out);

        // The shell process is still here to check the result.
        assert_eq!(res.unwrap(), 1);
        let s = String::from_utf8(out).unwrap();
        assert!(s.contains("couldn't find any binary with name 'frobnicate'"));
    }

    #[test]
    fn factory_rejects_other_names() {
        let factory = Factory::<Cd>::default();
        assert!(factory.try_create("dirs", &[]).is_none());
    }

    #[test]
    fn factory_turns_bad_args_into_a_usage_error() {
        let factory = Factory::<Cd>::default();
        let cmd = factory
            .try_create("cd", &["one", "two"])
            .expect("name matches, so a command is created");

        let mut out: Vec<u8> = Vec::new();
        let code = cmd.execute(&empty_env(), &mut out).unwrap();
        assert_eq!(code, 1);
        assert!(!out.is_empty());
    }
}
