//! WASM bindings for orviz
//!
//! This module provides JavaScript-friendly APIs for the browser front end:
//! solving tagged payloads and editor tooling for objective/constraint input.

use wasm_bindgen::prelude::*;

use crate::compiler;
use crate::lexer::{Lexer, TokenKind};
use crate::parser::{ParseError, Parser};
use crate::request::{DefaultPolicy, Request};

fn js_error(e: impl ToString) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

/// Solve a tagged JSON payload and return the response object
#[wasm_bindgen]
pub fn solve(payload: &str) -> Result<JsValue, JsValue> {
    let request = Request::from_json(payload, DefaultPolicy::Strict).map_err(js_error)?;
    let response = request.solve().map_err(js_error)?;
    serde_wasm_bindgen::to_value(&response).map_err(js_error)
}

/// Parse an objective and return `{ coefficients, sense }`
#[wasm_bindgen]
pub fn parse_objective(source: &str) -> Result<JsValue, JsValue> {
    let objective = compiler::parse_objective(source).map_err(js_error)?;
    serde_wasm_bindgen::to_value(&objective).map_err(js_error)
}

/// Parse a constraint and return `{ coefficients, op, rhs }`
#[wasm_bindgen]
pub fn parse_constraint(source: &str) -> Result<JsValue, JsValue> {
    let constraint = compiler::parse_constraint(source).map_err(js_error)?;
    serde_wasm_bindgen::to_value(&constraint).map_err(js_error)
}

/// Tokenize source code and return tokens as JSON
#[wasm_bindgen]
pub fn tokenize(source: &str) -> Result<JsValue, JsValue> {
    let tokens: Vec<TokenInfo> = Lexer::tokenize(source)
        .into_iter()
        .map(|t| TokenInfo {
            kind: format!("{:?}", t.kind),
            text: t.text,
            start: t.span.start,
            end: t.span.end,
        })
        .collect();
    serde_wasm_bindgen::to_value(&tokens).map_err(js_error)
}

/// Token information for JavaScript
#[derive(serde::Serialize)]
struct TokenInfo {
    kind: String,
    text: String,
    start: usize,
    end: usize,
}

/// Validate an objective (`is_constraint = false`) or a constraint and
/// return diagnostics as JSON
#[wasm_bindgen]
pub fn validate(source: &str, is_constraint: bool) -> JsValue {
    let diagnostics = get_diagnostics(source, is_constraint);
    serde_wasm_bindgen::to_value(&diagnostics).unwrap_or(JsValue::NULL)
}

/// Get semantic tokens for syntax highlighting
#[wasm_bindgen]
pub fn get_semantic_tokens(source: &str) -> Result<JsValue, JsValue> {
    let tokens: Vec<SemanticToken> = Lexer::tokenize(source)
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| {
            let token_type = match t.kind {
                TokenKind::Max | TokenKind::Min => "keyword",
                TokenKind::Variable => "variable",
                TokenKind::Number => "number",
                TokenKind::Plus | TokenKind::Minus | TokenKind::Star => "operator",
                TokenKind::Le | TokenKind::Ge | TokenKind::Eq => "operator",
                TokenKind::Colon => "delimiter",
                TokenKind::Ident | TokenKind::Error | TokenKind::Eof => "error",
            };
            SemanticToken {
                start: t.span.start,
                end: t.span.end,
                token_type: token_type.to_string(),
            }
        })
        .collect();
    serde_wasm_bindgen::to_value(&tokens).map_err(js_error)
}

#[derive(serde::Serialize)]
struct SemanticToken {
    start: usize,
    end: usize,
    token_type: String,
}

#[derive(serde::Serialize)]
struct Diagnostic {
    start: usize,
    end: usize,
    severity: String,
    message: String,
}

fn get_diagnostics(source: &str, is_constraint: bool) -> Vec<Diagnostic> {
    let result: Result<usize, ParseError> = if is_constraint {
        Parser::parse_constraint(source).map(|c| c.lhs.max_variable())
    } else {
        Parser::parse_objective(source).map(|o| o.expr.max_variable())
    };

    match result {
        Err(e) => {
            let span = e.span();
            vec![Diagnostic {
                start: span.map(|s| s.start).unwrap_or(0),
                end: span.map(|s| s.end).unwrap_or(source.len()),
                severity: "error".to_string(),
                message: e.to_string(),
            }]
        }
        Ok(highest) if highest > orviz_solver::MIN_VARIABLES => vec![Diagnostic {
            start: 0,
            end: source.len(),
            severity: "warning".to_string(),
            message: format!(
                "x{} is referenced; the graphical solver only handles x1 and x2",
                highest
            ),
        }],
        Ok(_) => Vec::new(),
    }
}
