//! Filter text tokenizer.
//!
//! Tokens are separated by whitespace. Parentheses always stand alone, and
//! quoted strings may contain whitespace and backslash escapes.

use super::error::SyntaxError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LParen,
    RParen,
    /// Bare word: field, keyword, operator, number or unquoted string.
    Word(String),
    /// Quoted string with escapes already resolved.
    Quoted(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character of the token.
    pub position: usize,
}

impl Token {
    /// Human readable form for error messages.
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::LParen => "`(`".to_string(),
            TokenKind::RParen => "`)`".to_string(),
            TokenKind::Word(w) => format!("`{w}`"),
            TokenKind::Quoted(s) => format!("string {s:?}"),
        }
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::LParen,
                    position: pos,
                });
            }
            ')' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::RParen,
                    position: pos,
                });
            }
            '"' | '\'' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;

                while let Some((esc_pos, c)) = chars.next() {
                    match c {
                        _ if c == ch => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some((_, 'n')) => value.push('\n'),
                            Some((_, 't')) => value.push('\t'),
                            Some((_, escaped @ ('\\' | '"' | '\''))) => value.push(escaped),
                            Some((_, other)) => {
                                return Err(SyntaxError::new(
                                    esc_pos,
                                    "escape sequence (\\\\, \\\", \\', \\n, \\t)",
                                    format!("`\\{other}`"),
                                ))
                            }
                            None => break,
                        },
                        other => value.push(other),
                    }
                }

                if !closed {
                    return Err(SyntaxError::new(
                        input.len(),
                        format!("closing {ch} for string starting at {pos}"),
                        "end of input",
                    ));
                }

                tokens.push(Token {
                    kind: TokenKind::Quoted(value),
                    position: pos,
                });
            }
            _ => {
                let mut word = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\'') {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(Token {
                    kind: TokenKind::Word(word),
                    position: pos,
                });
            }
        }
    }

    Ok(tokens)
}
