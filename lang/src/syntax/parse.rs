use thiserror::Error;

use crate::syntax::{
    lex::{tokenize, LexError, Token, TokenKind},
    tree::{
        Expr,
        Expr::{ApplyExpr, DefineExpr, IntExpr, ListExpr, ParamExpr, RealExpr},
    },
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("SyntaxError: unexpected {0}")]
    UnexpectedToken(Token),
    #[error("SyntaxError: missing ']' for the list opened at offset {}", .0.offset)]
    UnterminatedList(Token),
    #[error("SyntaxError: malformed argument list in call to '{}' at offset {}", .0.text, .0.offset)]
    MalformedCall(Token),
    #[error("SyntaxError: expected '->' or '(' after identifier '{}' at offset {}", .0.text, .0.offset)]
    ExpectedArrowOrCall(Token),
    #[error("SyntaxError: could not parse the input, trailing {0}")]
    TrailingInput(Token),
    #[error("SyntaxError: malformed number literal {0}")]
    MalformedNumber(Token),
    #[error("SyntaxError: malformed parameter {0}")]
    MalformedParameter(Token),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

pub struct LfParser {
    tokens: Vec<Token>,
    cursor: usize,
}

impl LfParser {
    pub fn ast(input: &str) -> Result<Expr, CompileError> {
        let tokens = tokenize(input)?;
        Ok(LfParser::parse(tokens)?)
    }

    /// Parses exactly one expression spanning the whole token sequence.
    /// Parsing never consults the function table.
    pub fn parse(tokens: Vec<Token>) -> Result<Expr, ParseError> {
        let mut parser = LfParser::new(tokens);
        let expr = parser.expr()?;
        match parser.current().kind {
            TokenKind::Eof => Ok(expr),
            _ => Err(ParseError::TrailingInput(parser.current().clone())),
        }
    }

    fn new(mut tokens: Vec<Token>) -> LfParser {
        let end = tokens.last().map(|t| t.offset + t.text.len()).unwrap_or(0);
        match tokens.last().map(|t| t.kind) {
            Some(TokenKind::Eof) => (),
            _ => tokens.push(Token::new(TokenKind::Eof, "", end)),
        }
        LfParser { tokens, cursor: 0 }
    }

    fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.cursor.min(last)]
    }

    fn advance(&mut self) {
        if self.cursor + 1 < self.tokens.len() {
            self.cursor += 1;
        }
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Param => {
                self.advance();
                parse_param(token)
            }
            TokenKind::Int => {
                self.advance();
                parse_int(token)
            }
            TokenKind::Real => {
                self.advance();
                parse_real(token)
            }
            TokenKind::OpenSquare => self.list(token),
            TokenKind::Ident => self.define_or_apply(token),
            TokenKind::Comma
            | TokenKind::OpenRound
            | TokenKind::CloseRound
            | TokenKind::CloseSquare
            | TokenKind::Arrow
            | TokenKind::Eof => Err(ParseError::UnexpectedToken(token)),
        }
    }

    // Elements are written back to back, without separators.
    fn list(&mut self, open: Token) -> Result<Expr, ParseError> {
        self.advance();
        let mut exprs = Vec::new();

        loop {
            match self.current().kind {
                TokenKind::CloseSquare => {
                    self.advance();
                    return Ok(ListExpr(exprs));
                }
                TokenKind::Eof => return Err(ParseError::UnterminatedList(open)),
                _ => exprs.push(self.expr()?),
            }
        }
    }

    fn define_or_apply(&mut self, id: Token) -> Result<Expr, ParseError> {
        self.advance();
        match self.current().kind {
            TokenKind::Arrow => {
                self.advance();
                let body = self.expr()?;
                Ok(DefineExpr(id.text, Box::new(body)))
            }
            TokenKind::OpenRound => self.apply(id),
            _ => Err(ParseError::ExpectedArrowOrCall(id)),
        }
    }

    fn apply(&mut self, id: Token) -> Result<Expr, ParseError> {
        self.advance();
        let mut args = Vec::new();

        if self.current().kind == TokenKind::CloseRound {
            self.advance();
            return Ok(ApplyExpr(id.text, args));
        }

        loop {
            match self.current().kind {
                TokenKind::Comma | TokenKind::CloseRound | TokenKind::Eof => {
                    return Err(ParseError::MalformedCall(id))
                }
                _ => args.push(self.expr()?),
            }

            match self.current().kind {
                TokenKind::Comma => self.advance(),
                TokenKind::CloseRound => {
                    self.advance();
                    return Ok(ApplyExpr(id.text, args));
                }
                _ => return Err(ParseError::MalformedCall(id)),
            }
        }
    }
}

fn parse_param(token: Token) -> Result<Expr, ParseError> {
    let digits = token.text.trim_start_matches('#');
    match digits.parse::<usize>() {
        Ok(dbi) if !digits.is_empty() => Ok(ParamExpr(dbi)),
        _ => Err(ParseError::MalformedParameter(token)),
    }
}

fn has_mantissa(text: &str) -> bool {
    text.trim_start_matches(|c| c == '+' || c == '-')
        .starts_with(|c: char| c.is_ascii_digit())
}

fn parse_int(token: Token) -> Result<Expr, ParseError> {
    match token.text.parse::<i64>() {
        Ok(v) if has_mantissa(&token.text) => Ok(IntExpr(v)),
        _ => Err(ParseError::MalformedNumber(token)),
    }
}

fn parse_real(token: Token) -> Result<Expr, ParseError> {
    match token.text.parse::<f64>() {
        Ok(v) if has_mantissa(&token.text) => Ok(RealExpr(v)),
        _ => Err(ParseError::MalformedNumber(token)),
    }
}
