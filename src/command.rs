use crate::env::Environment;
use crate::include::InclusionStack;
use anyhow::Result;
use std::io::{Read, Write};

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Pull-based source of raw input lines.
///
/// The host interpreter calls [`next_line`](LineSource::next_line) whenever a statement
/// is not complete yet (an open quote, a trailing backslash) and it needs the next
/// physical line to carry on. `None` means the source is exhausted.
pub trait LineSource {
    /// Produce the next raw line, or `None` once there is nothing left.
    fn next_line(&mut self) -> Option<String>;
}

/// The host side of the shell: everything a command or a script runner may ask of the
/// session it runs in.
///
/// [`Interpreter`](crate::Interpreter) is the production implementation. Keeping this a
/// trait lets the include machinery be driven by any line interpreter.
pub trait Shell {
    /// Environment of the current session (variables, working directory, exit flag).
    fn env(&mut self) -> &mut Environment;

    /// Files currently being included by this session.
    fn includes(&mut self) -> &mut InclusionStack;

    /// Execute a single line.
    ///
    /// `continuation` is where further raw lines come from if the line does not hold a
    /// complete statement on its own.
    fn execute_line(
        &mut self,
        line: &str,
        continuation: Option<&mut dyn LineSource>,
    ) -> Result<ExitCode>;

    /// Send a human-readable diagnostic to the session's error stream.
    fn report_error(&mut self, message: &str);
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and directly by `include`,
/// which needs the whole [`Shell`] rather than just its environment.
pub trait ExecutableCommand {
    /// Executes the command.
    fn execute(
        self: Box<Self>,
        stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        shell: &mut dyn Shell,
    ) -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
