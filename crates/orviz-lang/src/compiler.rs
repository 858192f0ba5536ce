use orviz_solver::{
    Constraint, ConstraintOp, CornerPointSolver, LinearExpression, LpProblem, LpSolution, Objective, Sense,
    SolveError,
};
use thiserror::Error;

use crate::ast::*;
use crate::parser::{ParseError, Parser};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Invalid objective: {0}")]
    Objective(ParseError),
    #[error("Invalid constraint #{index} ({text:?}): {source}")]
    Constraint {
        index: usize,
        text: String,
        source: ParseError,
    },
    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// Lowers parsed declarations into solver models
pub struct Compiler;

impl Compiler {
    /// Dense coefficient vector; repeated variables are summed
    pub fn compile_expression(expr: &Expr) -> LinearExpression {
        let mut coefficients = vec![0.0; expr.max_variable()];
        for term in &expr.terms {
            coefficients[term.variable - 1] += term.coefficient;
        }
        LinearExpression::new(coefficients)
    }

    pub fn compile_objective(decl: &ObjectiveDecl) -> Objective {
        let sense = match decl.direction {
            Some(Direction::Min) => Sense::Minimize,
            Some(Direction::Max) | None => Sense::Maximize,
        };
        Objective {
            coefficients: Self::compile_expression(&decl.expr),
            sense,
        }
    }

    pub fn compile_constraint(decl: &ConstraintDecl) -> Constraint {
        let op = match decl.relation {
            Relation::Le => ConstraintOp::Le,
            Relation::Ge => ConstraintOp::Ge,
            Relation::Eq => ConstraintOp::Eq,
        };
        Constraint::new(Self::compile_expression(&decl.lhs), op, decl.rhs)
    }

    /// Parse and lower an objective and its constraints
    pub fn compile_lp<S: AsRef<str>>(objective: &str, constraints: &[S]) -> Result<LpProblem, CompileError> {
        let objective = parse_objective(objective).map_err(CompileError::Objective)?;
        let mut problem = LpProblem::new(objective);

        for (index, text) in constraints.iter().enumerate() {
            let text = text.as_ref();
            let constraint = parse_constraint(text).map_err(|source| CompileError::Constraint {
                index: index + 1,
                text: text.to_string(),
                source,
            })?;
            problem.constraints.push(constraint);
        }

        Ok(problem)
    }
}

pub fn parse_expression(text: &str) -> Result<LinearExpression, ParseError> {
    Parser::parse_expression(text).map(|expr| Compiler::compile_expression(&expr))
}

pub fn parse_objective(text: &str) -> Result<Objective, ParseError> {
    Parser::parse_objective(text).map(|decl| Compiler::compile_objective(&decl))
}

pub fn parse_constraint(text: &str) -> Result<Constraint, ParseError> {
    Parser::parse_constraint(text).map(|decl| Compiler::compile_constraint(&decl))
}

/// Solve a two-variable LP given as text with the corner-point method
pub fn solve_lp<S: AsRef<str>>(objective: &str, constraints: &[S]) -> Result<LpSolution, CompileError> {
    let problem = Compiler::compile_lp(objective, constraints)?;
    Ok(CornerPointSolver::new().solve(&problem)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orviz_solver::{Point2D, SolutionStatus};

    #[test]
    fn test_compile_expression() {
        let expr = parse_expression("3x1 + 2x2").unwrap();
        assert_eq!(expr.coefficients(), &[3.0, 2.0]);

        // Minimum length is two even when only x1 appears
        let expr = parse_expression("x1").unwrap();
        assert_eq!(expr.coefficients(), &[1.0, 0.0]);

        // Gaps are filled with zeros
        let expr = parse_expression("-x4 + 0.5x2").unwrap();
        assert_eq!(expr.coefficients(), &[0.0, 0.5, 0.0, -1.0]);
    }

    #[test]
    fn test_repeated_variables_are_summed() {
        let expr = parse_expression("x1 + 2x1 - x2").unwrap();
        assert_eq!(expr.coefficients(), &[3.0, -1.0]);
    }

    #[test]
    fn test_objective_round_trip() {
        let cases: &[&[f64]] = &[
            &[3.0, 2.0],
            &[-1.0, 0.5],
            &[2.25, -7.0, 1.0],
            &[0.125, 1.0, 0.0, 4.0],
            &[1.0, -1.0, 10.0, -0.75, 3.5],
        ];

        for coefficients in cases {
            let text = coefficients
                .iter()
                .enumerate()
                .filter(|(_, c)| **c != 0.0)
                .map(|(i, c)| {
                    let sign = if *c < 0.0 { "-" } else { "+" };
                    format!(" {} {}x{}", sign, c.abs(), i + 1)
                })
                .collect::<String>();

            let objective = parse_objective(&text).unwrap();
            assert_eq!(objective.sense, Sense::Maximize);
            for (i, expected) in coefficients.iter().enumerate() {
                let actual = objective.coefficients.coefficient(i);
                assert!((actual - expected).abs() < 1e-12, "{text}: x{} = {actual}, expected {expected}", i + 1);
            }
        }
    }

    #[test]
    fn test_compile_constraint() {
        let c = parse_constraint("2x1 + x2 <= 8").unwrap();
        assert_eq!(c.coefficients.coefficients(), &[2.0, 1.0]);
        assert_eq!(c.op, ConstraintOp::Le);
        assert_eq!(c.rhs, 8.0);

        let c = parse_constraint("x2 = 3").unwrap();
        assert_eq!(c.coefficients.coefficients(), &[0.0, 1.0]);
        assert_eq!(c.op, ConstraintOp::Eq);
    }

    #[test]
    fn test_compile_and_solve() {
        let solution = solve_lp("3x1 + 2x2", &["2x1 + x2 <= 8", "x1 + 2x2 <= 10"]).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        for vertex in [(0.0, 0.0), (4.0, 0.0), (2.0, 4.0), (0.0, 5.0)] {
            assert!(solution.feasible_vertices.contains(&Point2D::from(vertex)));
        }
        assert_eq!(solution.optimal_vertex, Some(Point2D::new(2.0, 4.0)));
        assert!((solution.optimal_value - 14.0).abs() < 1e-6);
    }

    #[test]
    fn test_solve_minimization_text() {
        let solution = solve_lp("min: 2x1 + 3x2", &["x1 + x2 >= 4", "x1 <= 3", "x2 <= 3"]).unwrap();
        assert_eq!(solution.optimal_vertex, Some(Point2D::new(3.0, 1.0)));
        assert!((solution.optimal_value - 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_constraint_error_reports_index() {
        let err = solve_lp("3x1 + 2x2", &["2x1 + x2 <= 8", "x1 + 2x2 10"]).unwrap_err();
        match err {
            CompileError::Constraint { index, text, .. } => {
                assert_eq!(index, 2);
                assert_eq!(text, "x1 + 2x2 10");
            }
            other => panic!("Expected constraint error, got {other:?}"),
        }
    }

    #[test]
    fn test_objective_error() {
        let err = solve_lp::<&str>("3x1 +", &[]).unwrap_err();
        assert!(matches!(err, CompileError::Objective(_)));
    }

    #[test]
    fn test_third_variable_rejected() {
        let err = solve_lp("x1 + x2 + x3", &["x1 <= 1"]).unwrap_err();
        assert_eq!(err, CompileError::Solve(SolveError::TooManyVariables(3)));
    }

    #[test]
    fn test_zero_third_coefficient_is_fine() {
        let solution = solve_lp("x1 + x2 + 0x3", &["x1 + x2 <= 2"]).unwrap();
        assert!((solution.optimal_value - 2.0).abs() < 1e-6);
    }
}
