use super::{loader, Frame, IncludeError, LineFeeder};
use crate::command::{LineSource, Shell};
use std::path::PathBuf;

/// Runs one script file through a [`Shell`], line by line.
///
/// A runner goes through `admit → load → execute → release`. The frame it admitted is
/// released whatever happens after admission, and any failure is reported to the shell
/// exactly once: by the runner where it happened. Failures coming back from a nested
/// include were already reported and are passed on untouched.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    path: PathBuf,
}

impl ScriptRunner {
    /// A runner for `path`, which is resolved against the shell's working directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn run(&self, shell: &mut dyn Shell) -> Result<(), IncludeError> {
        let resolved = shell.env().resolve(&self.path);
        let _span = tracing::debug_span!("include", path = %resolved.display()).entered();

        let mut frame = match shell.includes().admit(&resolved) {
            Ok(frame) => frame,
            Err(err) => return Err(fail(shell, err)),
        };

        let outcome = execute(&mut frame, shell);
        shell.includes().release(frame);
        outcome
    }
}

fn execute(frame: &mut Frame, shell: &mut dyn Shell) -> Result<(), IncludeError> {
    let lines = loader::load(frame.absolute_path()).map_err(|err| fail(shell, err))?;
    frame.fill(lines);

    let path = frame.absolute_path().to_path_buf();
    let mut feeder = LineFeeder::new(frame);
    while let Some(line) = feeder.next_line() {
        let line_number = feeder.line_number();
        if let Err(source) = shell.execute_line(&line, Some(&mut feeder as &mut dyn LineSource)) {
            return Err(match source.downcast::<IncludeError>() {
                Ok(nested) => nested,
                Err(source) => fail(
                    shell,
                    IncludeError::ExecutionFailed {
                        path,
                        line: line_number,
                        source,
                    },
                ),
            });
        }
        if shell.env().should_exit {
            tracing::debug!(line = line_number, "exit requested, stopping script");
            break;
        }
    }
    Ok(())
}

fn fail(shell: &mut dyn Shell, err: IncludeError) -> IncludeError {
    tracing::warn!(error = %err, "include failed");
    shell.report_error(&format!("include: {err}"));
    err
}
