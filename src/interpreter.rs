use crate::command::{CommandFactory, ExecutableCommand, ExitCode, LineSource, Shell};
use crate::config::ShellConfig;
use crate::env::Environment;
use crate::include::{InclusionStack, IncludeError, ScriptRunner};
use crate::io_adapters::Sink;
use crate::lexer::{self, WordPart};
use crate::parser::{self, SimpleCommand, Word};
use anyhow::anyhow;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::io::{Read, Write};

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal shell-like interpreter.
///
/// The interpreter maintains an [`Environment`], the stack of scripts being included, and
/// a list of [`CommandFactory`] objects that are queried to create commands by name. See
/// [`Default`] for the built-in factories included out of the box.
///
/// Example
/// ```
/// use include_shell::{Interpreter, Sink};
/// let (out, buf) = Sink::memory();
/// let mut sh = Interpreter::default().with_sinks(out, Sink::Stderr);
/// let code = sh.run("echo", &["hello", "world"]).unwrap();
/// assert_eq!(code, 0);
/// assert_eq!(&buf.borrow()[..], b"hello world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
    includes: InclusionStack,
    config: ShellConfig,
    stdout: Sink,
    stderr: Sink,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self::with_config(commands, ShellConfig::default())
    }

    /// Create a new interpreter with a custom set of command factories and settings.
    pub fn with_config(commands: Vec<Box<dyn CommandFactory>>, config: ShellConfig) -> Self {
        Self {
            env: Environment::new(),
            commands,
            includes: InclusionStack::new(config.max_include_depth),
            config,
            stdout: Sink::Stdout,
            stderr: Sink::Stderr,
        }
    }

    /// Redirect what commands print and where diagnostics go.
    ///
    /// When output goes to memory, commands read from an empty standard input instead of
    /// the terminal.
    pub fn with_sinks(mut self, stdout: Sink, stderr: Sink) -> Self {
        self.stdout = stdout;
        self.stderr = stderr;
        self
    }

    /// The builtins every shell gets: `pwd`, `cd`, `echo`, `exit` and `include`.
    pub fn default_commands() -> Vec<Box<dyn CommandFactory>> {
        use crate::builtin::*;
        vec![
            Box::new(Factory::<Pwd>::default()),
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Echo>::default()),
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Include>::default()),
        ]
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Run a single command invocation by name with arguments.
    ///
    /// Returns the command's exit code or an error if the command cannot be created
    /// or fails to execute.
    pub fn run(&mut self, name: &str, args: &[&str]) -> anyhow::Result<ExitCode> {
        let created = self
            .commands
            .iter()
            .find_map(|factory| factory.try_create(&self.env, name, args));
        let cmd = created.ok_or_else(|| anyhow!("command not found: {}", name))?;
        self.execute_command(cmd)
    }

    /// Run the script at `path` (relative to the current directory).
    ///
    /// Returns 0 when every line ran, -1 otherwise. Failures have already been reported
    /// on the error sink by then.
    pub fn include(&mut self, path: &str) -> ExitCode {
        match ScriptRunner::new(path).run(self) {
            Ok(()) => 0,
            Err(_) => -1,
        }
    }

    /// Read-Eval-Print Loop with file name completion and multi-line statements.
    pub fn repl(&mut self) -> rustyline::Result<()> {
        let mut rl: Editor<ShellHelper, DefaultHistory> = Editor::new()?;
        rl.set_helper(Some(ShellHelper::default()));

        while !self.env.should_exit {
            let prompt = self.config.prompt.clone();
            match rl.readline(&prompt) {
                Ok(line) => {
                    rl.add_history_entry(line.as_str())?;
                    let mut continuation = ReadlineSource { editor: &mut rl };
                    let source = Some(&mut continuation as &mut dyn LineSource);
                    if let Err(e) = self.execute_line(&line, source) {
                        // Failed includes have reported themselves.
                        if e.downcast_ref::<IncludeError>().is_none() {
                            self.report_error(&format!("{e:#}"));
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }

    fn execute_simple(&mut self, command: &SimpleCommand) -> anyhow::Result<ExitCode> {
        for assignment in &command.assignments {
            let value = self.word_to_string(&assignment.value);
            self.env.set_var(assignment.name.clone(), value);
        }

        let Some((name, rest)) = command.argv.split_first() else {
            return Ok(0);
        };
        let name = self.word_to_string(name);
        let args: Vec<String> = rest.iter().map(|word| self.word_to_string(word)).collect();
        let args_ref: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

        self.run(&name, &args_ref)
    }

    fn execute_command(&mut self, cmd: Box<dyn ExecutableCommand>) -> anyhow::Result<ExitCode> {
        let mut stdin: Box<dyn Read> = if self.stdout.is_process() {
            Box::new(std::io::stdin())
        } else {
            Box::new(std::io::empty())
        };
        let mut stdout = self.stdout.writer();
        let code = cmd.execute(&mut *stdin, &mut *stdout, self)?;
        stdout.flush()?;
        Ok(code)
    }

    /// Concatenate a word's parts, substituting variables; unset variables expand to
    /// nothing.
    fn word_to_string(&self, word: &Word) -> String {
        match word {
            Word::Literal(s) => s.clone(),
            Word::Compound(parts) => parts
                .iter()
                .map(|part| match part {
                    WordPart::Literal(text) => text.clone(),
                    WordPart::ParamSubst(name) => self.env.get_var(name).unwrap_or_default(),
                })
                .collect(),
        }
    }
}

impl Shell for Interpreter {
    fn env(&mut self) -> &mut Environment {
        &mut self.env
    }

    fn includes(&mut self) -> &mut InclusionStack {
        &mut self.includes
    }

    fn execute_line(
        &mut self,
        line: &str,
        continuation: Option<&mut dyn LineSource>,
    ) -> anyhow::Result<ExitCode> {
        let tokens = read_statement(line, continuation)?;
        let commands = parser::construct_commands(tokens)?;

        let mut status = 0;
        for command in &commands {
            status = self.execute_simple(command)?;
            if self.env.should_exit {
                break;
            }
        }
        Ok(status)
    }

    fn report_error(&mut self, message: &str) {
        let mut err = self.stderr.writer();
        if let Err(e) = writeln!(err, "{message}") {
            tracing::error!(error = %e, "could not write diagnostic: {message}");
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands:
    /// `pwd`, `cd`, `echo`, `exit` and `include`.
    fn default() -> Self {
        Self::with_config(Self::default_commands(), ShellConfig::default())
    }
}

/// Lex `line`, pulling more lines from `continuation` while the statement is incomplete.
fn read_statement(
    line: &str,
    mut continuation: Option<&mut dyn LineSource>,
) -> anyhow::Result<Vec<lexer::Token>> {
    let mut statement = line.to_string();
    loop {
        match lexer::split_into_tokens(&statement) {
            Ok(tokens) => return Ok(tokens),
            Err(e) if e.is_incomplete() => {
                let next = continuation
                    .as_mut()
                    .and_then(|source| source.next_line())
                    .ok_or_else(|| anyhow!("unexpected end of input: {e}"))?;
                if !statement.ends_with('\n') {
                    statement.push('\n');
                }
                statement.push_str(&next);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Continuation lines typed at the REPL, under a secondary prompt.
struct ReadlineSource<'a> {
    editor: &'a mut Editor<ShellHelper, DefaultHistory>,
}

impl LineSource for ReadlineSource<'_> {
    fn next_line(&mut self) -> Option<String> {
        let line = self.editor.readline("> ").ok()?;
        if let Err(e) = self.editor.add_history_entry(line.as_str()) {
            tracing::debug!(error = %e, "continuation line not added to history");
        }
        Some(line)
    }
}

/// Line editor helper completing file names, e.g. for `include`.
#[derive(Default)]
struct ShellHelper {
    completer: FilenameCompleter,
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        self.completer.complete(line, pos, ctx)
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}
