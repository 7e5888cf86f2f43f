use std::path::{Path, PathBuf};

/// Execution state of one file being included.
///
/// A frame is handed out by [`InclusionStack::admit`](super::InclusionStack::admit) and
/// must be given back to [`InclusionStack::release`](super::InclusionStack::release);
/// it is not `Clone`.
#[derive(Debug)]
pub struct Frame {
    name: String,
    absolute_path: PathBuf,
    lines: Vec<String>,
    cursor: usize,
}

impl Frame {
    pub(crate) fn new(absolute_path: PathBuf) -> Self {
        let name = absolute_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| absolute_path.display().to_string());
        Self {
            name,
            absolute_path,
            lines: Vec::new(),
            cursor: 1,
        }
    }

    /// Base name of the file, for display.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical path; what cycle detection compares.
    pub fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// 1-based index of the next line to be produced.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn fill(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.cursor = 1;
    }

    pub(super) fn advance(&mut self) -> Option<&str> {
        let line = self.lines.get(self.cursor - 1)?;
        self.cursor += 1;
        Some(line)
    }
}
