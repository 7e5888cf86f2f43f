use std::collections::HashMap;
use std::env as stdenv;
use std::path::{Path, PathBuf};

/// Mutable, user-level view of the process environment used by the interpreter.
///
/// The environment contains:
/// - `vars`: shell variables, seeded from the process environment.
/// - `current_dir`: the session's working directory; relative paths (scripts passed to
///   `include`, targets of `cd`) are resolved against it.
/// - `should_exit`: set by `exit`; the REPL and running scripts stop when they see it.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of shell variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The working directory of this session.
    pub current_dir: PathBuf,
    /// When set to true, indicates that the session should stop executing.
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// This copies variables from `std::env::vars()` and initializes `current_dir`
    /// from `std::env::current_dir()`. The `should_exit` flag is initialized to `false`.
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            vars,
            current_dir,
            should_exit: false,
        }
    }

    /// An environment with no variables, rooted at `current_dir`.
    pub fn empty(current_dir: impl Into<PathBuf>) -> Self {
        Self {
            vars: HashMap::new(),
            current_dir: current_dir.into(),
            should_exit: false,
        }
    }

    /// Get the value of a shell variable.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    /// Set or override a shell variable.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Resolve `path` against the session's working directory.
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.current_dir.join(path)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::env::Environment;
    use std::path::PathBuf;

    #[test]
    fn env_set_and_get_var() {
        let mut env = Environment::empty("/");

        // initially absent
        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);

        env.set_var("KEY", "VALUE");

        assert_eq!(env.get_var("KEY"), Some("VALUE".to_string()));
    }

    #[test]
    fn env_reads_from_process_env() {
        let env = Environment::new();
        assert!(env.get_var("PATH").is_some());
    }

    #[test]
    fn resolve_relative_and_absolute() {
        let env = Environment::empty("/work");
        assert_eq!(env.resolve("a.txt"), PathBuf::from("/work/a.txt"));
        assert_eq!(env.resolve("/etc/a.txt"), PathBuf::from("/etc/a.txt"));
    }
}
