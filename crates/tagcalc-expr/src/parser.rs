use crate::ast::*;
use crate::lexer::{Lexer, Span, Token, TokenKind, number_value};
use thiserror::Error;

/// Parenthesis and sign nesting deeper than this is rejected.
pub const MAX_DEPTH: usize = 256;

/// Binary operators allowed in one expression. Chains build left-deep trees,
/// so this bounds their height.
pub const MAX_OPERATORS: usize = 4096;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of expression")]
    UnexpectedEof,
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Empty expression")]
    EmptyExpression,
    #[error("Unexpected {found} after complete expression at position {span:?}")]
    TrailingInput { found: String, span: Span },
    #[error("Expression nested deeper than {MAX_DEPTH} levels")]
    TooDeep,
    #[error("Expression has more than {MAX_OPERATORS} operators")]
    TooLong,
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    operators: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            operators: 0,
        }
    }

    pub fn parse(source: &str) -> Result<Expr, ParseError> {
        let tokens = Lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        parser.parse_expression()
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(t) if t.kind != TokenKind::Eof => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: format!("'{}'", t.text),
                span: t.span,
            },
            _ => ParseError::UnexpectedEof,
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        match self.current().cloned() {
            Some(t) if t.kind == kind => {
                self.advance();
                Ok(t)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::TooDeep);
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    fn binary(&mut self, left: Expr, op: BinaryOp, right: Expr) -> Result<Expr, ParseError> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(ParseError::TooLong);
        }
        Ok(Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        if self.peek_kind() == TokenKind::Eof {
            return Err(ParseError::EmptyExpression);
        }

        let expr = self.parse_additive()?;

        match self.current() {
            Some(t) if t.kind != TokenKind::Eof => Err(ParseError::TrailingInput {
                found: format!("'{}'", t.text),
                span: t.span,
            }),
            _ => Ok(expr),
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.binary(left, op, right)?;
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = self.binary(left, op, right)?;
        }

        Ok(left)
    }

    fn sign(&self) -> Option<UnaryOp> {
        match self.peek_kind() {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Neg),
            _ => None,
        }
    }

    // A leading sign applies to the whole power chain: -2^2 is -(2^2)
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let Some(op) = self.sign() else {
            return self.parse_power();
        };
        self.advance();
        self.descend()?;
        let operand = self.parse_unary()?;
        self.ascend();
        Ok(Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    // Left-associative like the other binary operators: 2^3^2 is (2^3)^2
    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_primary()?;

        while self.peek_kind() == TokenKind::Caret {
            self.advance();
            let right = self.parse_signed()?;
            left = self.binary(left, BinaryOp::Pow, right)?;
        }

        Ok(left)
    }

    // Exponent operand: signs bind tighter here so that 2^-1 is 2^(-1)
    fn parse_signed(&mut self) -> Result<Expr, ParseError> {
        let Some(op) = self.sign() else {
            return self.parse_primary();
        };
        self.advance();
        self.descend()?;
        let operand = self.parse_signed()?;
        self.ascend();
        Ok(Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind() {
            TokenKind::Number => {
                let text = self.advance().map(|t| t.text.clone()).unwrap_or_default();
                let value = number_value(&text).ok_or(ParseError::InvalidNumber(text))?;
                Ok(Expr::Number(value))
            }
            TokenKind::LParen => {
                self.advance();
                self.descend()?;
                let expr = self.parse_additive()?;
                self.expect(TokenKind::RParen, "')'")?;
                self.ascend();
                Ok(Expr::Paren(Box::new(expr)))
            }
            _ => Err(self.unexpected("number or '('")),
        }
    }
}
