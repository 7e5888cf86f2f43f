//! Lexical analysis (tokenization) of one shell statement.
//!
//! A statement may span several physical lines: an open quote or a backslash right before
//! the end of input make the lexer report an *incomplete* statement, and the caller is
//! expected to append the next line and try again.

use thiserror::Error;

/// A part of a word, which can be either literal text or a parameter substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordPart {
    /// Literal text that requires no further processing.
    Literal(String),
    /// Parameter substitution, `$NAME` or `${NAME}`. Holds the name.
    ParamSubst(String),
}

/// Represents a token resulting from lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A word token, which may be composed of multiple parts (`WordPart`).
    Word(Vec<WordPart>),
    /// The command separator, `;`.
    Separator,
}

/// Errors that can occur during the lexical analysis process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexingError {
    /// A closing quote (single or double) was not found.
    #[error("unterminated quote")]
    UnfinishedQuote,
    /// The input ends with a backslash.
    #[error("nothing to escape after the final backslash")]
    UnfinishedEscape,
    /// A closing brace for parameter substitution `${...}` was not found.
    #[error("unterminated parameter substitution")]
    UnfinishedParamSubst,
    /// `${...}` holds something that is not a variable name.
    #[error("bad substitution: ${{{0}}}")]
    InvalidParamName(String),
}

impl LexingError {
    /// Whether more input could turn the statement into a valid one.
    pub fn is_incomplete(&self) -> bool {
        matches!(
            self,
            LexingError::UnfinishedQuote | LexingError::UnfinishedEscape
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    ReadingSingleQuote,
    ReadingDoubleQuote,
}

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    current_word: Vec<WordPart>,
    buffer: String,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            current_word: Vec::new(),
            buffer: String::new(),
        }
    }

    fn make_tokens(&mut self) -> Result<Vec<Token>, LexingError> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Start => {
                    if ch == '#' {
                        break;
                    }
                    self.handle_unquoted(ch, &mut out)?
                }
                LexingState::ReadingWord => self.handle_unquoted(ch, &mut out)?,
                LexingState::ReadingSingleQuote => self.handle_single_quote(ch),
                LexingState::ReadingDoubleQuote => self.handle_double_quote(ch)?,
            }
        }

        match self.state {
            LexingState::ReadingSingleQuote | LexingState::ReadingDoubleQuote => {
                return Err(LexingError::UnfinishedQuote);
            }
            LexingState::ReadingWord => self.finish_word(&mut out),
            LexingState::Start => {}
        }

        Ok(out)
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    /// Outside of quotes; a word may or may not be in progress.
    fn handle_unquoted(&mut self, ch: char, out: &mut Vec<Token>) -> Result<(), LexingError> {
        match ch {
            ' ' | '\t' | '\n' | '\r' => self.finish_word(out),
            ';' => {
                self.finish_word(out);
                out.push(Token::Separator);
            }
            '\'' => self.state = LexingState::ReadingSingleQuote,
            '"' => self.state = LexingState::ReadingDoubleQuote,
            '\\' => {
                if self.skip_line_continuation() {
                    // A continuation at the very end still needs the next line.
                    if self.peek_char().is_none() {
                        return Err(LexingError::UnfinishedEscape);
                    }
                    return Ok(());
                }
                let escaped = self.read_char().ok_or(LexingError::UnfinishedEscape)?;
                self.buffer.push(escaped);
                self.state = LexingState::ReadingWord;
            }
            '$' => {
                self.read_substitution()?;
                self.state = LexingState::ReadingWord;
            }
            c => {
                self.buffer.push(c);
                self.state = LexingState::ReadingWord;
            }
        }
        Ok(())
    }

    fn handle_single_quote(&mut self, ch: char) {
        match ch {
            '\'' => self.state = LexingState::ReadingWord,
            c => self.buffer.push(c),
        }
    }

    fn handle_double_quote(&mut self, ch: char) -> Result<(), LexingError> {
        match ch {
            '"' => self.state = LexingState::ReadingWord,
            '\\' => {
                if self.skip_line_continuation() {
                    return Ok(());
                }
                match self.peek_char() {
                    Some(c @ ('"' | '\\' | '$')) => {
                        self.read_char();
                        self.buffer.push(c);
                    }
                    _ => self.buffer.push('\\'),
                }
            }
            '$' => self.read_substitution()?,
            c => self.buffer.push(c),
        }
        Ok(())
    }

    /// Consumes a newline (or CRLF) following a backslash. The pair vanishes from the
    /// statement.
    fn skip_line_continuation(&mut self) -> bool {
        match (self.peek_char(), self.input.get(self.pos + 1).copied()) {
            (Some('\n'), _) => {
                self.pos += 1;
                true
            }
            (Some('\r'), Some('\n')) => {
                self.pos += 2;
                true
            }
            _ => false,
        }
    }

    /// Called right after a `$`.
    fn read_substitution(&mut self) -> Result<(), LexingError> {
        match self.peek_char() {
            Some('{') => {
                self.read_char();
                let mut name = String::new();
                loop {
                    match self.read_char() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => return Err(LexingError::UnfinishedParamSubst),
                    }
                }
                if !is_param_name(&name) {
                    return Err(LexingError::InvalidParamName(name));
                }
                self.push_param(name);
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(c) = self.peek_char() {
                    if !(c.is_ascii_alphanumeric() || c == '_') {
                        break;
                    }
                    name.push(c);
                    self.read_char();
                }
                self.push_param(name);
            }
            // A lone `$` is just a dollar sign.
            _ => self.buffer.push('$'),
        }
        Ok(())
    }

    fn push_param(&mut self, name: String) {
        self.finalize_literal();
        self.current_word.push(WordPart::ParamSubst(name));
    }

    fn finalize_literal(&mut self) {
        if !self.buffer.is_empty() {
            self.current_word
                .push(WordPart::Literal(std::mem::take(&mut self.buffer)));
        }
    }

    fn finish_word(&mut self, out: &mut Vec<Token>) {
        if self.state == LexingState::ReadingWord {
            self.finalize_literal();
            out.push(Token::Word(std::mem::take(&mut self.current_word)));
            self.state = LexingState::Start;
        }
    }
}

fn is_param_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split one statement into tokens.
///
/// Returns an error if the statement is malformed; check
/// [`LexingError::is_incomplete`] to tell a statement that just needs more lines.
pub fn split_into_tokens(line: &str) -> Result<Vec<Token>, LexingError> {
    let mut lexer = LexingFSM::new(line);
    lexer.make_tokens()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lit(s: &str) -> Token {
        Token::Word(vec![WordPart::Literal(s.to_string())])
    }

    #[test]
    fn splits_words_and_ignores_line_terminator() {
        assert_eq!(
            split_into_tokens("include inner.txt\n").unwrap(),
            vec![lit("include"), lit("inner.txt")]
        );
        assert!(split_into_tokens("  \r\n").unwrap().is_empty());
    }

    #[test]
    fn separators_and_comments() {
        assert_eq!(
            split_into_tokens("echo a; pwd # trailing words").unwrap(),
            vec![lit("echo"), lit("a"), Token::Separator, lit("pwd")]
        );
        assert!(split_into_tokens("# only a comment\n").unwrap().is_empty());
        assert_eq!(split_into_tokens("echo a#b").unwrap(), vec![lit("echo"), lit("a#b")]);
    }

    #[test]
    fn quotes_join_into_one_word() {
        assert_eq!(
            split_into_tokens("echo 'a b'\"c d\"e").unwrap(),
            vec![lit("echo"), lit("a bc de")]
        );
        assert_eq!(
            split_into_tokens("echo ''").unwrap(),
            vec![lit("echo"), Token::Word(vec![])]
        );
    }

    #[test]
    fn substitutions() {
        assert_eq!(
            split_into_tokens("echo pre$HOME/x \"${USER}!\" '$NOPE' $ 5").unwrap(),
            vec![
                lit("echo"),
                Token::Word(vec![
                    WordPart::Literal("pre".to_string()),
                    WordPart::ParamSubst("HOME".to_string()),
                    WordPart::Literal("/x".to_string()),
                ]),
                Token::Word(vec![
                    WordPart::ParamSubst("USER".to_string()),
                    WordPart::Literal("!".to_string()),
                ]),
                lit("$NOPE"),
                lit("$"),
                lit("5"),
            ]
        );
    }

    #[test]
    fn escapes() {
        assert_eq!(
            split_into_tokens(r#"echo a\ b "q\"\$x\n""#).unwrap(),
            vec![lit("echo"), lit("a b"), lit("q\"$x\\n")]
        );
    }

    #[test]
    fn backslash_newline_continues_the_statement() {
        assert_eq!(
            split_into_tokens("echo a\\\nb \\\r\nc\n").unwrap(),
            vec![lit("echo"), lit("ab"), lit("c")]
        );
    }

    #[test]
    fn incomplete_statements() {
        let open_quote = split_into_tokens("echo 'abc\n").unwrap_err();
        assert_eq!(open_quote, LexingError::UnfinishedQuote);
        assert!(open_quote.is_incomplete());

        let trailing_backslash = split_into_tokens("echo abc \\").unwrap_err();
        assert_eq!(trailing_backslash, LexingError::UnfinishedEscape);
        assert!(trailing_backslash.is_incomplete());

        let continued_script_line = split_into_tokens("echo abc \\\n").unwrap_err();
        assert_eq!(continued_script_line, LexingError::UnfinishedEscape);
    }

    #[test]
    fn multi_line_quote_keeps_newline() {
        assert_eq!(
            split_into_tokens("echo 'one\ntwo'\n").unwrap(),
            vec![lit("echo"), lit("one\ntwo")]
        );
    }

    #[test]
    fn broken_substitutions_are_not_incomplete() {
        let open = split_into_tokens("echo ${HOME").unwrap_err();
        assert_eq!(open, LexingError::UnfinishedParamSubst);
        assert!(!open.is_incomplete());

        let bad = split_into_tokens("echo ${1x}").unwrap_err();
        assert_eq!(bad, LexingError::InvalidParamName("1x".to_string()));
    }
}
