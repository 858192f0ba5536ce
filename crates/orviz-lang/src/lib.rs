pub mod ast;
pub mod compiler;
pub mod lexer;
pub mod parser;

#[cfg(feature = "serde")]
pub mod request;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use ast::*;
pub use compiler::{CompileError, Compiler, parse_constraint, parse_expression, parse_objective, solve_lp};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{ParseError, Parser};

#[cfg(feature = "serde")]
pub use request::{DefaultPolicy, LpResponse, ProblemKind, Request, RequestError, Response};
