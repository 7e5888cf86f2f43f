//! A tiny, embeddable shell-like command runner with script inclusion.
//!
//! The interesting part of this crate is the [`include`] module: given a file path it
//! refuses cyclic inclusion, loads the file eagerly, and feeds the host interpreter one
//! line at a time through a pull-based [`LineSource`](command::LineSource) so that a
//! statement spanning several physical lines can ask for more input mid-parse.
//!
//! The main entry point is [`Interpreter`], which implements the [`Shell`](command::Shell)
//! host contract on top of a small lexer, parser and a set of argh-driven builtins.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod include;
mod interpreter;
mod io_adapters;
mod lexer;
mod parser;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;
pub use io_adapters::Sink;
