use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Shell};
use crate::env::Environment;
use crate::include::ScriptRunner;
use crate::interpreter::Factory;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Executes the command using provided IO streams and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(
        self,
        stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

/// A failing builtin reports its error and exits with status 1; it does not abort the
/// statement or the script it is part of.
impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        shell: &mut dyn Shell,
    ) -> Result<ExitCode> {
        match T::execute(*self, stdin, stdout, shell.env()) {
            Ok(x) => Ok(x),
            Err(e) => {
                shell.report_error(&format!("{}: {e:#}", T::name()));
                Ok(1)
            }
        }
    }
}

/// Stands in for a command whose arguments did not parse (or asked for `--help`).
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        shell: &mut dyn Shell,
    ) -> Result<ExitCode> {
        if self.is_error {
            shell.report_error(self.output.trim_end());
            Ok(1)
        } else {
            stdout.write_all(self.output.as_bytes())?;
            Ok(0)
        }
    }
}

fn parse_args<T: FromArgs + ExecutableCommand + 'static>(
    name: &str,
    args: &[&str],
) -> Box<dyn ExecutableCommand> {
    match T::from_args(&[name], args) {
        Ok(cmd) => Box::new(cmd),
        Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
            output,
            is_error: status.is_err(),
        }),
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        (name == T::name()).then(|| parse_args::<T>(name, args))
    }
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        writeln!(stdout, "{}", env.current_dir.to_string_lossy())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Change the current working directory of the shell.
/// If no target is provided, changes to the directory specified by the HOME variable.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory. Defaults to $HOME when omitted.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        _stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let target = match &self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => match env.get_var("HOME") {
                Some(home) => PathBuf::from(home),
                None => anyhow::bail!("no target and HOME not set"),
            },
        };

        let new_dir = env.resolve(target);
        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("can't canonicalize {}", new_dir.display()))?;
        if !canonical.is_dir() {
            anyhow::bail!("{}: not a directory", canonical.display());
        }

        env.current_dir = canonical;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Stop the shell, including any script being run.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored; the shell always stops with status 0
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        _stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        env.should_exit = true;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// write the arguments to standard output, separated by spaces.
/// by default, a trailing newline is printed.
pub struct Echo {
    #[argh(switch, short = 'n')]
    /// do not output the trailing newline.
    pub no_newline: bool,

    #[argh(positional, greedy)]
    /// values to print as-is, separated by spaces.
    pub args: Vec<String>,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        let s = self.args.join(" ");
        if self.no_newline {
            write!(stdout, "{}", s)?;
        } else {
            writeln!(stdout, "{}", s)?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// execute a script file, line by line, as if it were typed into the shell.
pub struct Include {
    #[argh(positional)]
    /// file to execute
    pub path: String,
}

impl Include {
    pub const NAME: &'static str = "include";
}

/// Unlike the other builtins, a failed include is an error: the script that contains
/// the `include` line has to stop as well.
impl ExecutableCommand for Include {
    fn execute(
        self: Box<Self>,
        _stdin: &mut dyn Read,
        _stdout: &mut dyn Write,
        shell: &mut dyn Shell,
    ) -> Result<ExitCode> {
        ScriptRunner::new(self.path).run(shell)?;
        Ok(0)
    }
}

impl CommandFactory for Factory<Include> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        (name == Include::NAME).then(|| parse_args::<Include>(name, args))
    }
}
