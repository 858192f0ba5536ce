mod error;
mod lp;
mod problem;
mod solution;
mod transportation;
mod tsp;

pub use error::SolveError;
pub use lp::CornerPointSolver;
pub use problem::{
    Constraint, ConstraintOp, LinearExpression, LpProblem, MIN_VARIABLES, Objective, Sense,
    TransportationProblem, TspProblem,
};
pub use solution::{
    Allocation, LpSolution, Point2D, SolutionStatus, TransportationSolution, TspMethod, TspSolution,
};
pub use transportation::solve_transportation;
pub use tsp::{EXHAUSTIVE_LIMIT, TspSolver, solve_tsp};
