use crate::lexer::{Token, WordPart};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// `NAME=` at the start of a word makes it an assignment.
static ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)=").expect("valid assignment regex"));

/// A shell word, either a simple literal or a compound (with substitutions)
#[derive(Debug, Clone, PartialEq)]
pub enum Word {
    Literal(String),
    Compound(Vec<WordPart>),
}

impl Word {
    fn from_parts(parts: Vec<WordPart>) -> Self {
        if parts.is_empty() {
            return Word::Literal(String::new());
        }
        if let [WordPart::Literal(s)] = parts.as_slice() {
            return Word::Literal(s.clone());
        }
        Word::Compound(parts)
    }
}

/// A variable assignment `name=value` preceding a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub value: Word,
}

/// One command of a statement: assignments first, then the command name and its
/// arguments. Either list may be empty, not both.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleCommand {
    pub assignments: Vec<Assignment>,
    pub argv: Vec<Word>,
}

/// Errors that can occur while grouping tokens into commands.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParsingError {
    /// Two separators with nothing between them, or a separator starting the statement.
    #[error("syntax error near unexpected token `;'")]
    EmptyCommand,
}

struct CommandBuilder {
    tokens: Vec<Token>,
    pos: usize,
}

impl CommandBuilder {
    fn from(tokens: Vec<Token>) -> Self {
        CommandBuilder { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Parse a statement: command (';' command)* ';'?
    fn build(mut self) -> Result<Vec<SimpleCommand>, ParsingError> {
        let mut commands = Vec::new();
        while self.peek().is_some() {
            commands.push(self.parse_command()?);
            // The command stopped either at the end or at a separator.
            self.consume();
        }
        Ok(commands)
    }

    /// Parse a command: assignment* word*
    fn parse_command(&mut self) -> Result<SimpleCommand, ParsingError> {
        let mut assignments = Vec::new();
        let mut argv = Vec::new();

        while let Some(Token::Word(parts)) = self.peek().cloned() {
            self.pos += 1;
            if argv.is_empty() {
                if let Some(assignment) = Self::as_assignment(&parts) {
                    assignments.push(assignment);
                    continue;
                }
            }
            argv.push(Word::from_parts(parts));
        }

        if assignments.is_empty() && argv.is_empty() {
            return Err(ParsingError::EmptyCommand);
        }

        Ok(SimpleCommand { assignments, argv })
    }

    fn as_assignment(parts: &[WordPart]) -> Option<Assignment> {
        let (WordPart::Literal(head), rest) = parts.split_first()? else {
            return None;
        };
        let captures = ASSIGNMENT.captures(head)?;
        let name = captures[1].to_string();
        let remainder = &head[captures[0].len()..];

        let mut value = Vec::with_capacity(parts.len());
        if !remainder.is_empty() {
            value.push(WordPart::Literal(remainder.to_string()));
        }
        value.extend(rest.iter().cloned());

        Some(Assignment {
            name,
            value: Word::from_parts(value),
        })
    }
}

/// Group the tokens of one statement into the commands to run, in order.
///
/// An empty statement yields no commands.
pub fn construct_commands(tokens: Vec<Token>) -> Result<Vec<SimpleCommand>, ParsingError> {
    CommandBuilder::from(tokens).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::split_into_tokens;
    use pretty_assertions::assert_eq;

    fn lit(s: &str) -> Word {
        Word::Literal(s.to_string())
    }

    fn parse(line: &str) -> Result<Vec<SimpleCommand>, ParsingError> {
        construct_commands(split_into_tokens(line).unwrap())
    }

    #[test]
    fn plain_command() {
        let commands = parse("include inner.txt\n").unwrap();
        assert_eq!(
            commands,
            vec![SimpleCommand {
                assignments: vec![],
                argv: vec![lit("include"), lit("inner.txt")],
            }]
        );
    }

    #[test]
    fn blank_statement_has_no_commands() {
        assert!(parse("   \n").unwrap().is_empty());
        assert!(parse("# comment").unwrap().is_empty());
    }

    #[test]
    fn separated_commands_keep_their_order() {
        let commands = parse("echo a; echo b;").unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].argv, vec![lit("echo"), lit("a")]);
        assert_eq!(commands[1].argv, vec![lit("echo"), lit("b")]);
    }

    #[test]
    fn empty_command_between_separators() {
        assert_eq!(parse("echo a;; echo b"), Err(ParsingError::EmptyCommand));
        assert_eq!(parse("; echo b"), Err(ParsingError::EmptyCommand));
    }

    #[test]
    fn leading_assignments() {
        let commands = parse("A=1 B=\"x $HOME\" C= echo D=2").unwrap();
        let command = &commands[0];

        assert_eq!(
            command.assignments,
            vec![
                Assignment {
                    name: "A".to_string(),
                    value: lit("1"),
                },
                Assignment {
                    name: "B".to_string(),
                    value: Word::Compound(vec![
                        WordPart::Literal("x ".to_string()),
                        WordPart::ParamSubst("HOME".to_string()),
                    ]),
                },
                Assignment {
                    name: "C".to_string(),
                    value: lit(""),
                },
            ]
        );
        // After the command name, NAME=value is an ordinary argument.
        assert_eq!(command.argv, vec![lit("echo"), lit("D=2")]);
    }

    #[test]
    fn assignment_only_statement() {
        let commands = parse("SHELL_PROMPT='> '").unwrap();
        assert!(commands[0].argv.is_empty());
        assert_eq!(commands[0].assignments[0].value, lit("> "));
    }

    #[test]
    fn invalid_names_are_arguments() {
        let commands = parse("1A=x").unwrap();
        assert!(commands[0].assignments.is_empty());
        assert_eq!(commands[0].argv, vec![lit("1A=x")]);
    }
}
