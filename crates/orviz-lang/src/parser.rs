use crate::ast::*;
use crate::lexer::{Lexer, Span, Token, TokenKind};
use thiserror::Error;

/// Largest variable index accepted; the coefficient vector is sized by it
pub const MAX_VARIABLE_INDEX: usize = 1000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of input: expected {0}")]
    UnexpectedEof(String),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Invalid variable {text}: index must be between 1 and {MAX_VARIABLE_INDEX}")]
    InvalidVariable { text: String, span: Span },
    #[error("Expression has no terms")]
    EmptyExpression,
    #[error("Missing relational operator (<=, >= or =)")]
    MissingRelation,
}

impl ParseError {
    /// Source location of the error, when it has one
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::UnexpectedToken { span, .. } | ParseError::InvalidVariable { span, .. } => Some(*span),
            _ => None,
        }
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse a bare linear expression such as `3x1 - x2`
    pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
        let mut parser = Parser::new(Lexer::tokenize(source));
        let expr = parser.parse_expr()?;
        parser.expect_end("'+', '-' or end of input")?;
        Ok(expr)
    }

    /// Parse an objective such as `max: 3x1 + 2x2`
    pub fn parse_objective(source: &str) -> Result<ObjectiveDecl, ParseError> {
        let mut parser = Parser::new(Lexer::tokenize(source));
        parser.parse_objective_decl()
    }

    /// Parse a constraint such as `2x1 + x2 <= 8`
    pub fn parse_constraint(source: &str) -> Result<ConstraintDecl, ParseError> {
        let mut parser = Parser::new(Lexer::tokenize(source));
        parser.parse_constraint_decl()
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
                found: t.describe(),
                span: t.span,
            },
            _ => ParseError::UnexpectedEof(expected.to_string()),
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

    fn expect_end(&mut self, expected: &str) -> Result<(), ParseError> {
        if self.peek_kind() == TokenKind::Eof {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// End of the most recently consumed token
    fn last_end(&self, fallback: usize) -> usize {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.span.end)
            .unwrap_or(fallback)
    }

    fn start(&self) -> usize {
        self.current().map(|t| t.span.start).unwrap_or(0)
    }

    fn parse_objective_decl(&mut self) -> Result<ObjectiveDecl, ParseError> {
        let start = self.start();

        let direction = match self.peek_kind() {
            TokenKind::Max => Some(Direction::Max),
            TokenKind::Min => Some(Direction::Min),
            _ => None,
        };
        if direction.is_some() {
            self.advance();
            if self.peek_kind() == TokenKind::Colon {
                self.advance();
            }
        }

        let expr = self.parse_expr()?;
        self.expect_end("'+', '-' or end of input")?;

        Ok(ObjectiveDecl {
            span: Span::new(start, self.last_end(start)),
            direction,
            expr,
        })
    }

    fn parse_constraint_decl(&mut self) -> Result<ConstraintDecl, ParseError> {
        let start = self.start();
        let lhs = self.parse_expr()?;

        let relation = match self.peek_kind() {
            TokenKind::Le => Relation::Le,
            TokenKind::Ge => Relation::Ge,
            TokenKind::Eq => Relation::Eq,
            TokenKind::Eof => return Err(ParseError::MissingRelation),
            _ => return Err(self.unexpected("'+', '-', '<=', '>=' or '='")),
        };
        self.advance();

        let rhs = self.parse_signed_number()?;
        self.expect_end("end of input after right-hand side")?;

        Ok(ConstraintDecl {
            span: Span::new(start, self.last_end(start)),
            lhs,
            relation,
            rhs,
        })
    }

    fn parse_signed_number(&mut self) -> Result<f64, ParseError> {
        let sign = self.parse_sign();
        let token = self.expect(TokenKind::Number, "number")?;
        Ok(sign * parse_number(&token)?)
    }

    /// Consume an optional `+`/`-`, returning the multiplier
    fn parse_sign(&mut self) -> f64 {
        match self.peek_kind() {
            TokenKind::Plus => {
                self.advance();
                1.0
            }
            TokenKind::Minus => {
                self.advance();
                -1.0
            }
            _ => 1.0,
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();

        // The first term may omit its sign; later terms must be joined by + or -
        let first_kind = self.peek_kind();
        if !matches!(
            first_kind,
            TokenKind::Plus | TokenKind::Minus | TokenKind::Number | TokenKind::Variable
        ) {
            if first_kind == TokenKind::Eof || first_kind.is_relation() {
                return Err(ParseError::EmptyExpression);
            }
            return Err(self.unexpected("term"));
        }

        let mut terms = vec![self.parse_term()?];
        while matches!(self.peek_kind(), TokenKind::Plus | TokenKind::Minus) {
            terms.push(self.parse_term()?);
        }

        Ok(Expr {
            span: Span::new(start, self.last_end(start)),
            terms,
        })
    }

    fn parse_term(&mut self) -> Result<Term, ParseError> {
        let start = self.start();
        // A binary operator may be followed by one unary sign: `x1 + -2x2`
        let mut sign = self.parse_sign();
        if matches!(self.peek_kind(), TokenKind::Plus | TokenKind::Minus) {
            sign *= self.parse_sign();
        }

        let mut coefficient = 1.0;
        if self.peek_kind() == TokenKind::Number {
            let token = self.advance().cloned().ok_or(ParseError::UnexpectedEof("number".into()))?;
            coefficient = parse_number(&token)?;
            if self.peek_kind() == TokenKind::Star {
                self.advance();
            }
        }

        let token = self.expect(TokenKind::Variable, "variable (x1, x2, ...)")?;
        let variable = parse_variable(&token)?;

        Ok(Term {
            span: Span::new(start, token.span.end),
            coefficient: sign * coefficient,
            variable,
        })
    }
}

fn parse_number(token: &Token) -> Result<f64, ParseError> {
    token
        .text
        .parse()
        .map_err(|_| ParseError::InvalidNumber(token.text.clone()))
}

fn parse_variable(token: &Token) -> Result<usize, ParseError> {
    let invalid = || ParseError::InvalidVariable {
        text: token.text.clone(),
        span: token.span,
    };
    let index: usize = token.text[1..].parse().map_err(|_| invalid())?;
    if index == 0 || index > MAX_VARIABLE_INDEX {
        return Err(invalid());
    }
    Ok(index)
}
