//! Script inclusion: run a file as if each of its lines had been typed into the shell.
//!
//! The pieces, leaves first:
//! - [`Frame`]: one active file (path, buffered lines, read cursor).
//! - [`InclusionStack`]: the files a session is currently including; refuses cycles and
//!   bounds the nesting depth.
//! - [`loader::load`]: reads a whole file up front and refuses anything that is not text.
//! - [`LineFeeder`]: hands out a frame's lines one by one, also to the interpreter when it
//!   needs continuation lines.
//! - [`ScriptRunner`]: ties the above together for one include, recursing through the
//!   host [`Shell`](crate::command::Shell) for nested includes.

mod feeder;
mod frame;
pub mod loader;
mod runner;
mod stack;

pub use feeder::LineFeeder;
pub use frame::Frame;
pub use runner::ScriptRunner;
pub use stack::InclusionStack;

use std::path::PathBuf;
use std::string::FromUtf8Error;
use thiserror::Error;

/// Why an include did not run to completion.
///
/// Each of these ends the include that produced it. Outer includes hand the error on
/// unchanged.
#[derive(Error, Debug)]
pub enum IncludeError {
    #[error("recursive include for file {}", .path.display())]
    CycleDetected { path: PathBuf },

    #[error("include depth limit of {limit} reached at {}", .path.display())]
    DepthExceeded { path: PathBuf, limit: usize },

    #[error("error opening file {}: {source}", .path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a text file: {source}", .path.display())]
    NotText {
        path: PathBuf,
        #[source]
        source: FromUtf8Error,
    },

    #[error("{}, line {line}: {source:#}", .path.display())]
    ExecutionFailed {
        path: PathBuf,
        line: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl IncludeError {
    /// The file the error is about.
    pub fn path(&self) -> &std::path::Path {
        match self {
            IncludeError::CycleDetected { path }
            | IncludeError::DepthExceeded { path, .. }
            | IncludeError::OpenFailed { path, .. }
            | IncludeError::NotText { path, .. }
            | IncludeError::ExecutionFailed { path, .. } => path,
        }
    }

    /// Line the error happened on, when it happened while executing.
    pub fn line(&self) -> Option<usize> {
        match self {
            IncludeError::ExecutionFailed { line, .. } => Some(*line),
            _ => None,
        }
    }
}
