use crate::builtin::{Cd, Dirs, Exec};
use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::EnvSnapshot;
use crate::exec::{self, LaunchError};
use anyhow::Result;
use log::debug;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;
use std::marker::PhantomData;

/// Factory allows creating instances of ExecutableCommand.
///
/// Builtins get their [`CommandFactory`] implementation through the blanket
/// impl in the builtin module; the external command fallback has its own.
pub(crate) struct Factory<T> {
    _phantom: PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

/// Command that is not a builtin.
///
/// Its factory accepts every name, so it must be registered after all the
/// builtins: it is the shell's "unfound command" hook, and it resolves and
/// launches whatever reaches it.
pub struct ExternalCommand {
    argv: Vec<String>,
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>> {
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(name.to_string());
        argv.extend(args.iter().map(|a| a.to_string()));
        Some(Box::new(ExternalCommand { argv }))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(self: Box<Self>, env: &EnvSnapshot, stdout: &mut dyn Write) -> Result<ExitCode> {
        match exec::launch(env, &self.argv) {
            Ok(()) => Ok(0),
            Err(e @ LaunchError::Resolve(_)) => {
                writeln!(stdout, "{}", e)?;
                Ok(1)
            }
            Err(e) => {
                // Spawn or wait failed; the shell itself keeps running.
                writeln!(stdout, "tsh: {}", e)?;
                Ok(1)
            }
        }
    }
}

/// An interactive shell: a captured environment plus an ordered chain of
/// command factories.
///
/// Example
/// ```
/// use tsh::Shell;
/// let sh = Shell::default();
/// let code = sh.dispatch(&["dirs".to_string()]);
/// assert_eq!(code, 0);
/// ```
pub struct Shell {
    env: EnvSnapshot,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Shell {
    /// Create a shell with a custom set of command factories, tried in order.
    pub fn new(env: EnvSnapshot, commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self { env, commands }
    }

    /// Route one argument vector through the factory chain and execute the
    /// first command produced. An empty vector is a no-op with status 0.
    pub fn dispatch(&self, argv: &[String]) -> ExitCode {
        self.dispatch_to(argv, &mut std::io::stdout())
    }

    /// Like [`Shell::dispatch`], but with a caller-provided output stream.
    pub fn dispatch_to(&self, argv: &[String], stdout: &mut dyn Write) -> ExitCode {
        let Some((name, args)) = argv.split_first() else {
            return 0;
        };
        let args: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(name, &args) {
                return match cmd.execute(&self.env, stdout) {
                    Ok(code) => code,
                    Err(e) => {
                        eprintln!("tsh: {}: {}", name, e);
                        1
                    }
                };
            }
        }
        // The external fallback accepts every name; getting here means the
        // chain was built without it.
        eprintln!("tsh: {}: command not found", name);
        1
    }

    /// Read-eval loop: reads lines until end of input or interrupt.
    ///
    /// Each line is split into words and dispatched; the command's status is
    /// logged and otherwise discarded, so the loop survives every failed
    /// command and comes back to the prompt.
    pub fn repl(&mut self) -> rustyline::Result<()> {
        let mut rl = DefaultEditor::new()?;
        loop {
            match rl.readline("tsh $ ") {
                Ok(line) => {
                    rl.add_history_entry(line.as_str())?;
                    let argv = match shell_words::split(&line) {
                        Ok(argv) => argv,
                        Err(e) => {
                            eprintln!("tsh: {}", e);
                            continue;
                        }
                    };
                    let status = self.dispatch(&argv);
                    debug!("dispatch finished with status {}", status);
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("tsh: read error: {}", err);
                    break;
                }
            }
        }
        Ok(())
    }
}

impl Default for Shell {
    /// A shell with the stock builtins (`cd`, `dirs`, `exec`) and the
    /// external command fallback registered last.
    fn default() -> Self {
        Self::new(
            EnvSnapshot::capture(),
            vec![
                Box::new(Factory::<Cd>::default()),
                Box::new(Factory::<Dirs>::default()),
                Box::new(Factory::<Exec>::default()),
                Box::new(Factory::<ExternalCommand>::default()),
            ],
        )
    }
}
