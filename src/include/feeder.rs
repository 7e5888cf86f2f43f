use super::Frame;
use crate::command::LineSource;

/// Hands out the lines of one [`Frame`] in order.
///
/// The runner pulls statements from it and also lends it to the interpreter, which
/// pulls continuation lines for statements that span several physical lines. Both go
/// through the same cursor, so a line is never delivered twice.
pub struct LineFeeder<'a> {
    frame: &'a mut Frame,
}

impl<'a> LineFeeder<'a> {
    pub fn new(frame: &'a mut Frame) -> Self {
        Self { frame }
    }

    /// Number of the last line handed out, 0 if none was.
    pub fn line_number(&self) -> usize {
        self.frame.cursor() - 1
    }
}

impl LineSource for LineFeeder<'_> {
    fn next_line(&mut self) -> Option<String> {
        self.frame.advance().map(str::to_owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;

    fn frame_with(lines: &[&str]) -> Frame {
        let mut frame = Frame::new(PathBuf::from("/tmp/feeder.txt"));
        frame.fill(lines.iter().map(|l| l.to_string()).collect());
        frame
    }

    #[rstest]
    #[case::empty(&[])]
    #[case::one(&["echo a\n"])]
    #[case::several(&["echo a\n", "echo b\n", "echo c"])]
    fn delivers_lines_in_order_then_nothing(#[case] lines: &[&str]) {
        let mut frame = frame_with(lines);
        let mut feeder = LineFeeder::new(&mut frame);

        for (i, expected) in lines.iter().enumerate() {
            assert_eq!(feeder.next_line().as_deref(), Some(*expected));
            assert_eq!(feeder.line_number(), i + 1);
        }
        for _ in 0..3 {
            assert_eq!(feeder.next_line(), None);
            assert_eq!(feeder.line_number(), lines.len());
        }
    }

    #[test]
    fn cursor_lives_in_the_frame() {
        let mut frame = frame_with(&["one\n", "two\n", "three\n"]);
        {
            let mut feeder = LineFeeder::new(&mut frame);
            feeder.next_line();
        }
        assert_eq!(frame.cursor(), 2);

        let mut feeder = LineFeeder::new(&mut frame);
        assert_eq!(feeder.next_line().as_deref(), Some("two\n"));
    }
}
