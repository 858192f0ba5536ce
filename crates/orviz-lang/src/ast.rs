use crate::lexer::Span;

/// One `[sign][coefficient]x<index>` term
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub span: Span,
    /// Signed coefficient; `1.0` / `-1.0` when written without a number
    pub coefficient: f64,
    /// 1-based variable index as written
    pub variable: usize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub span: Span,
    pub terms: Vec<Term>,
}

impl Expr {
    /// Highest variable index referenced
    pub fn max_variable(&self) -> usize {
        self.terms.iter().map(|t| t.variable).max().unwrap_or(0)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Max,
    Min,
}

/// `[max|min][:] expr`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveDecl {
    pub span: Span,
    /// `None` when the text carries no direction keyword
    pub direction: Option<Direction>,
    pub expr: Expr,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Le,
    Ge,
    Eq,
}

/// `expr (<=|>=|=) number`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDecl {
    pub span: Span,
    pub lhs: Expr,
    pub relation: Relation,
    pub rhs: f64,
}
