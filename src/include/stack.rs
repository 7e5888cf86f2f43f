use super::{Frame, IncludeError};
use crate::config::DEFAULT_MAX_INCLUDE_DEPTH;
use std::fs;
use std::path::{Path, PathBuf};

/// The files a session is currently including, innermost last.
///
/// One stack belongs to one session and is threaded through nested includes by the
/// host shell. No path appears on it twice.
#[derive(Debug)]
pub struct InclusionStack {
    active: Vec<PathBuf>,
    max_depth: usize,
}

impl InclusionStack {
    /// An empty stack admitting at most `max_depth` nested files.
    pub fn new(max_depth: usize) -> Self {
        Self {
            active: Vec::new(),
            max_depth,
        }
    }

    /// Number of files currently being included.
    pub fn depth(&self) -> usize {
        self.active.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether `path` (after canonicalization) is being included right now.
    pub fn is_active(&self, path: &Path) -> bool {
        let key = canonical_key(path);
        self.active.iter().any(|p| *p == key)
    }

    /// Start including `path`.
    ///
    /// Fails without touching the stack if the file is already active (a cycle) or the
    /// depth limit is reached. On success the returned frame must be passed back to
    /// [`release`](Self::release) once the include is over, whatever its outcome.
    pub fn admit(&mut self, path: &Path) -> Result<Frame, IncludeError> {
        let absolute_path = canonical_key(path);
        if self.active.contains(&absolute_path) {
            return Err(IncludeError::CycleDetected {
                path: absolute_path,
            });
        }
        if self.active.len() >= self.max_depth {
            return Err(IncludeError::DepthExceeded {
                path: absolute_path,
                limit: self.max_depth,
            });
        }

        self.active.push(absolute_path.clone());
        tracing::debug!(path = %absolute_path.display(), depth = self.active.len(), "admitted");
        Ok(Frame::new(absolute_path))
    }

    /// Finish including `frame`'s file.
    pub fn release(&mut self, frame: Frame) {
        let popped = self.active.pop();
        debug_assert_eq!(
            popped.as_deref(),
            Some(frame.absolute_path()),
            "frames must be released innermost first"
        );
        tracing::debug!(path = %frame.absolute_path().display(), depth = self.active.len(), "released");
    }
}

impl Default for InclusionStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INCLUDE_DEPTH)
    }
}

/// Symlinks are resolved when the file exists; a missing file still gets an absolute key
/// so that opening it can fail with a proper error later on.
fn canonical_key(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, "echo hi\n").unwrap();
        path
    }

    #[test]
    fn admit_and_release_keep_the_stack_balanced() {
        let dir = TempDir::new().unwrap();
        let a = touch(&dir, "a.txt");
        let b = touch(&dir, "b.txt");
        let mut stack = InclusionStack::default();

        let fa = stack.admit(&a).unwrap();
        let fb = stack.admit(&b).unwrap();
        assert_eq!(stack.depth(), 2);
        assert!(stack.is_active(&a));
        assert_eq!(fb.name(), "b.txt");

        stack.release(fb);
        stack.release(fa);
        assert_eq!(stack.depth(), 0);
        assert!(!stack.is_active(&a));
    }

    #[test]
    fn same_file_twice_is_a_cycle() {
        let dir = TempDir::new().unwrap();
        let a = touch(&dir, "a.txt");
        let mut stack = InclusionStack::default();

        let frame = stack.admit(&a).unwrap();
        let err = stack.admit(&a).unwrap_err();

        assert!(matches!(err, IncludeError::CycleDetected { .. }));
        assert_eq!(stack.depth(), 1);
        stack.release(frame);
    }

    #[test]
    fn different_spellings_of_one_file_are_a_cycle() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let a = touch(&dir, "a.txt");
        let roundabout = dir.path().join("sub").join("..").join("a.txt");
        let mut stack = InclusionStack::default();

        let frame = stack.admit(&a).unwrap();
        let err = stack.admit(&roundabout).unwrap_err();

        assert_eq!(err.path(), fs::canonicalize(&a).unwrap());
        stack.release(frame);
    }

    #[test]
    fn missing_file_is_admitted_with_an_absolute_key() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.txt");
        let mut stack = InclusionStack::default();

        let frame = stack.admit(&missing).unwrap();
        assert!(frame.absolute_path().is_absolute());
        assert_eq!(frame.name(), "missing.txt");
        stack.release(frame);
    }

    #[test]
    fn depth_limit_is_enforced_without_mutation() {
        let dir = TempDir::new().unwrap();
        let a = touch(&dir, "a.txt");
        let b = touch(&dir, "b.txt");
        let mut stack = InclusionStack::new(1);

        let frame = stack.admit(&a).unwrap();
        let err = stack.admit(&b).unwrap_err();

        assert!(matches!(err, IncludeError::DepthExceeded { limit: 1, .. }));
        assert_eq!(stack.depth(), 1);
        stack.release(frame);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn separate_stacks_do_not_share_state() {
        let dir = TempDir::new().unwrap();
        let a = touch(&dir, "a.txt");
        let mut first = InclusionStack::default();
        let mut second = InclusionStack::default();

        let f1 = first.admit(&a).unwrap();
        let f2 = second.admit(&a).unwrap();

        first.release(f1);
        second.release(f2);
    }
}
