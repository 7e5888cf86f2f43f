use std::cell::RefCell;
use std::io::{Result as IoResult, Write};
use std::rc::Rc;

/// Memory-backed writer for capturing what commands print.
///
/// Clones of the underlying buffer can be kept by the caller to read the collected
/// bytes after the commands ran.
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    /// A writer appending to an existing shared buffer.
    pub fn sharing(buf: Rc<RefCell<Vec<u8>>>) -> Self {
        Self { buf }
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

/// Where a session sends its output or its diagnostics.
#[derive(Clone, Default)]
pub enum Sink {
    /// The process' standard output.
    #[default]
    Stdout,
    /// The process' standard error.
    Stderr,
    /// An in-memory buffer, for embedding and tests.
    Memory(Rc<RefCell<Vec<u8>>>),
}

impl Sink {
    /// A fresh in-memory sink and a handle to read it back.
    pub fn memory() -> (Self, Rc<RefCell<Vec<u8>>>) {
        let buf = Rc::new(RefCell::new(Vec::new()));
        (Sink::Memory(buf.clone()), buf)
    }

    /// Whether this sink is attached to the process rather than to memory.
    pub fn is_process(&self) -> bool {
        !matches!(self, Sink::Memory(_))
    }

    pub(crate) fn writer(&self) -> Box<dyn Write> {
        match self {
            Sink::Stdout => Box::new(std::io::stdout()),
            Sink::Stderr => Box::new(std::io::stderr()),
            Sink::Memory(buf) => Box::new(MemWriter::sharing(buf.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_collects_every_writer() {
        let (sink, buf) = Sink::memory();

        write!(sink.writer(), "one ").unwrap();
        writeln!(sink.writer(), "two").unwrap();

        assert_eq!(String::from_utf8(buf.borrow().clone()).unwrap(), "one two\n");
        assert!(!sink.is_process());
        assert!(Sink::Stderr.is_process());
    }
}
