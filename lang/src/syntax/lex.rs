use std::{fmt::Formatter, iter::Peekable, str::CharIndices};

use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Comma,
    OpenRound,
    CloseRound,
    OpenSquare,
    CloseSquare,
    Arrow,
    // `#` followed by a (possibly empty) digit run
    Param,
    Ident,
    Int,
    Real,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub offset: usize,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("LexError: unknown character '{ch}' at offset {offset}")]
    UnknownCharacter { ch: char, offset: usize },
}

impl Token {
    pub fn new(kind: TokenKind, text: &str, offset: usize) -> Token {
        Token {
            kind,
            text: text.to_owned(),
            offset,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input at offset {}", self.offset),
            _ => write!(f, "'{}' at offset {}", self.text, self.offset),
        }
    }
}

/// Splits a single source line into tokens. The returned sequence always
/// ends with exactly one [`TokenKind::Eof`] token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).lex()
}

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    pub fn lex(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            let (start, ch) = match self.chars.peek() {
                Some(&next) => next,
                None => break,
            };

            let kind = match ch {
                ' ' | '\t' => {
                    self.chars.next();
                    continue;
                }
                ',' => self.single(TokenKind::Comma),
                '(' => self.single(TokenKind::OpenRound),
                ')' => self.single(TokenKind::CloseRound),
                '[' => self.single(TokenKind::OpenSquare),
                ']' => self.single(TokenKind::CloseSquare),
                '-' if self.input[start..].starts_with("->") => {
                    self.chars.next();
                    self.chars.next();
                    TokenKind::Arrow
                }
                '#' => {
                    self.chars.next();
                    self.eat_while(|c| c.is_ascii_digit());
                    TokenKind::Param
                }
                '0'..='9' | '+' | '-' => self.number(),
                c if c.is_ascii_alphabetic() || c == '_' => {
                    self.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
                    TokenKind::Ident
                }
                _ => return Err(LexError::UnknownCharacter { ch, offset: start }),
            };

            let end = self.offset();
            tokens.push(Token::new(kind, &self.input[start..end], start));
        }

        tokens.push(Token::new(TokenKind::Eof, "", self.input.len()));
        Ok(tokens)
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.chars.next();
        kind
    }

    // A sign without digits is accepted here; the parser rejects the
    // empty mantissa when it converts the literal.
    fn number(&mut self) -> TokenKind {
        if let Some(&(_, '+')) | Some(&(_, '-')) = self.chars.peek() {
            self.chars.next();
        }
        self.eat_while(|c| c.is_ascii_digit());

        match self.chars.peek() {
            Some(&(_, '.')) => {
                self.chars.next();
                self.eat_while(|c| c.is_ascii_digit());
                TokenKind::Real
            }
            _ => TokenKind::Int,
        }
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(&(_, c)) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            self.chars.next();
        }
    }

    fn offset(&mut self) -> usize {
        match self.chars.peek() {
            Some(&(idx, _)) => idx,
            None => self.input.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{tokenize, LexError, Token, TokenKind, TokenKind::*};
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_definition_tokens() {
        assert_eq!(
            kinds("fact -> if(eq(#0,1), 1, mul(#0, 2))"),
            vec![
                Ident, Arrow, Ident, OpenRound, Ident, OpenRound, Param, Comma, Int, CloseRound,
                Comma, Int, Comma, Ident, OpenRound, Param, Comma, Int, CloseRound, CloseRound,
                Eof
            ]
        );
    }

    #[test]
    fn test_offsets_and_text() {
        let tokens = tokenize("  [#12\t-3.5]").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::new(OpenSquare, "[", 2),
                Token::new(Param, "#12", 3),
                Token::new(Real, "-3.5", 7),
                Token::new(CloseSquare, "]", 11),
                Token::new(Eof, "", 12),
            ]
        );
    }

    #[test]
    fn test_arrow_wins_over_sign() {
        assert_eq!(kinds("f->-1"), vec![Ident, Arrow, Int, Eof]);
    }

    #[test]
    fn test_lone_sign_is_lexed() {
        let tokens = tokenize("+ -").unwrap();
        assert_eq!(tokens[0], Token::new(Int, "+", 0));
        assert_eq!(tokens[1], Token::new(Int, "-", 2));
    }

    #[test]
    fn test_empty_parameter_marker() {
        assert_eq!(tokenize("#").unwrap()[0], Token::new(Param, "#", 0));
    }

    #[test]
    fn test_real_without_fraction() {
        assert_eq!(tokenize("7.").unwrap()[0], Token::new(Real, "7.", 0));
    }

    #[test]
    fn test_identifier_with_digits_and_underscores() {
        assert_eq!(
            tokenize("_is_prime2").unwrap()[0],
            Token::new(Ident, "_is_prime2", 0)
        );
    }

    #[test]
    fn test_empty_input_is_only_eof() {
        assert_eq!(tokenize("").unwrap(), vec![Token::new(Eof, "", 0)]);
        assert_eq!(tokenize(" \t ").unwrap(), vec![Token::new(Eof, "", 3)]);
    }

    #[test]
    fn test_unknown_character() {
        assert_eq!(
            tokenize("add(1, 2) $"),
            Err(LexError::UnknownCharacter {
                ch: '$',
                offset: 10
            })
        );
        assert_eq!(
            tokenize(".5"),
            Err(LexError::UnknownCharacter { ch: '.', offset: 0 })
        );
    }
}
