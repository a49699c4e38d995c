pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;

pub use ast::*;
pub use eval::{calculate, eval};
pub use lexer::{Lexer, Span, Token, TokenKind, number_value};
pub use parser::{MAX_DEPTH, MAX_OPERATORS, ParseError, Parser};
