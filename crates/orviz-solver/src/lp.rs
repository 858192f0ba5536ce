use log::debug;

use crate::error::SolveError;
use crate::problem::{Constraint, ConstraintOp, LpProblem, MIN_VARIABLES};
use crate::solution::{LpSolution, Point2D, SolutionStatus};

/// Graphical (corner-point) solver for two-variable linear programs
///
/// Candidate vertices are the origin, every constraint's axis intercepts and
/// every pairwise intersection of constraint boundaries. Candidates outside
/// the first quadrant or violating any constraint are dropped, the rest are
/// rounded, deduplicated and sorted, and the objective is evaluated at each.
pub struct CornerPointSolver {
    /// Slack allowed when checking constraints and the non-negativity bound
    tolerance: f64,
    /// Determinants at or below this are treated as parallel boundaries
    parallel_tolerance: f64,
    /// Decimal places kept on reported vertices
    precision: u32,
}

impl Default for CornerPointSolver {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            parallel_tolerance: 1e-10,
            precision: 2,
        }
    }
}

impl CornerPointSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_parallel_tolerance(mut self, tol: f64) -> Self {
        self.parallel_tolerance = tol;
        self
    }

    pub fn with_precision(mut self, places: u32) -> Self {
        self.precision = places;
        self
    }

    pub fn solve(&self, problem: &LpProblem) -> Result<LpSolution, SolveError> {
        let n_vars = problem.num_variables();
        if n_vars > MIN_VARIABLES {
            return Err(SolveError::TooManyVariables(n_vars));
        }

        let candidates = self.candidate_vertices(&problem.constraints);
        let vertices = self.feasible_vertices(&candidates, &problem.constraints);
        debug!(
            "corner-point: {} candidates, {} feasible vertices",
            candidates.len(),
            vertices.len()
        );

        let objective = &problem.objective;
        let mut best: Option<(Point2D, f64)> = None;
        for &point in &vertices {
            let value = objective.coefficients.evaluate(point.x, point.y);
            let better = match best {
                None => true,
                Some((_, incumbent)) => objective.improves(value, incumbent),
            };
            if better {
                best = Some((point, value));
            }
        }

        let Some((optimal_vertex, optimal_value)) = best else {
            return Ok(LpSolution::infeasible(objective.worst_value()));
        };

        let status = if self.is_unbounded(problem) {
            SolutionStatus::Unbounded
        } else {
            SolutionStatus::Optimal
        };

        Ok(LpSolution {
            status,
            feasible_vertices: vertices,
            optimal_vertex: Some(optimal_vertex),
            optimal_value,
        })
    }

    /// Origin, axis intercepts and boundary intersections, clamped to the first quadrant
    fn candidate_vertices(&self, constraints: &[Constraint]) -> Vec<Point2D> {
        let mut points = vec![Point2D::new(0.0, 0.0)];

        for c in constraints {
            let (a, b) = (c.coefficients.coefficient(0), c.coefficients.coefficient(1));
            if a != 0.0 {
                self.push_clamped(&mut points, c.rhs / a, 0.0);
            }
            if b != 0.0 {
                self.push_clamped(&mut points, 0.0, c.rhs / b);
            }
        }

        for (i, c1) in constraints.iter().enumerate() {
            for c2 in &constraints[i + 1..] {
                if let Some((x, y)) = self.intersect(c1, c2) {
                    self.push_clamped(&mut points, x, y);
                }
            }
        }

        points
    }

    fn push_clamped(&self, points: &mut Vec<Point2D>, x: f64, y: f64) {
        if x >= -self.tolerance && y >= -self.tolerance {
            points.push(Point2D::new(x.max(0.0), y.max(0.0)));
        }
    }

    /// Intersection of two boundary lines by Cramer's rule
    fn intersect(&self, c1: &Constraint, c2: &Constraint) -> Option<(f64, f64)> {
        let (a1, b1) = (c1.coefficients.coefficient(0), c1.coefficients.coefficient(1));
        let (a2, b2) = (c2.coefficients.coefficient(0), c2.coefficients.coefficient(1));

        let det = a1 * b2 - b1 * a2;
        if det.abs() <= self.parallel_tolerance {
            return None;
        }

        let x = (c1.rhs * b2 - c2.rhs * b1) / det;
        let y = (a1 * c2.rhs - a2 * c1.rhs) / det;
        Some((x, y))
    }

    /// Feasible candidates, rounded, deduplicated and sorted by `(x, y)`
    fn feasible_vertices(&self, candidates: &[Point2D], constraints: &[Constraint]) -> Vec<Point2D> {
        let mut feasible: Vec<Point2D> = candidates
            .iter()
            .filter(|p| {
                constraints
                    .iter()
                    .all(|c| c.is_satisfied(p.x, p.y, self.tolerance))
            })
            .map(|p| p.rounded(self.precision))
            .collect();

        feasible.sort_by(|p, q| p.x.total_cmp(&q.x).then(p.y.total_cmp(&q.y)));
        feasible.dedup();
        feasible
    }

    /// Whether a feasible ray from the region improves the objective forever
    ///
    /// The recession cone of the region within the first quadrant is bounded
    /// by the axis directions and the constraint boundary directions, so it
    /// suffices to test those.
    fn is_unbounded(&self, problem: &LpProblem) -> bool {
        const EPS: f64 = 1e-9;

        let mut directions = vec![(1.0, 0.0), (0.0, 1.0)];
        for c in &problem.constraints {
            let (a, b) = (c.coefficients.coefficient(0), c.coefficients.coefficient(1));
            let norm = a.hypot(b);
            if norm > EPS {
                directions.push((b / norm, -a / norm));
                directions.push((-b / norm, a / norm));
            }
        }

        directions.into_iter().any(|(dx, dy)| {
            if dx < -EPS || dy < -EPS {
                return false;
            }
            let in_cone = problem.constraints.iter().all(|c| {
                let slope = c.coefficients.evaluate(dx, dy);
                match c.op {
                    ConstraintOp::Le => slope <= EPS,
                    ConstraintOp::Ge => slope >= -EPS,
                    ConstraintOp::Eq => slope.abs() <= EPS,
                }
            });
            let gain = problem.objective.coefficients.evaluate(dx, dy);
            in_cone && problem.objective.improves(gain, 0.0) && gain.abs() > EPS
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Objective;

    fn textbook_problem() -> LpProblem {
        // Maximize: 3x1 + 2x2
        // Subject to:
        //   2x1 + x2 <= 8
        //   x1 + 2x2 <= 10
        let mut problem = LpProblem::new(Objective::maximize(vec![3.0, 2.0]));
        problem.add_constraint(vec![2.0, 1.0], ConstraintOp::Le, 8.0);
        problem.add_constraint(vec![1.0, 2.0], ConstraintOp::Le, 10.0);
        problem
    }

    #[test]
    fn test_simple_maximization() {
        let solution = CornerPointSolver::new().solve(&textbook_problem()).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(
            solution.feasible_vertices,
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(0.0, 5.0),
                Point2D::new(2.0, 4.0),
                Point2D::new(4.0, 0.0),
            ]
        );
        assert_eq!(solution.optimal_vertex, Some(Point2D::new(2.0, 4.0)));
        assert!((solution.optimal_value - 14.0).abs() < 1e-6, "obj = {} (expected 14)", solution.optimal_value);
    }

    #[test]
    fn test_minimization_with_ge() {
        // Minimize: 2x + 3y
        // Subject to:
        //   x + y >= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=9
        let mut problem = LpProblem::new(Objective::minimize(vec![2.0, 3.0]));
        problem.add_constraint(vec![1.0, 1.0], ConstraintOp::Ge, 4.0);
        problem.add_constraint(vec![1.0, 0.0], ConstraintOp::Le, 3.0);
        problem.add_constraint(vec![0.0, 1.0], ConstraintOp::Le, 3.0);

        let solution = CornerPointSolver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(
            solution.feasible_vertices,
            vec![Point2D::new(1.0, 3.0), Point2D::new(3.0, 1.0), Point2D::new(3.0, 3.0)]
        );
        assert_eq!(solution.optimal_vertex, Some(Point2D::new(3.0, 1.0)));
        assert!((solution.optimal_value - 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_infeasible() {
        // x1 >= 5, x1 <= 3
        let mut problem = LpProblem::new(Objective::maximize(vec![1.0, 0.0]));
        problem.add_constraint(vec![1.0, 0.0], ConstraintOp::Ge, 5.0);
        problem.add_constraint(vec![1.0, 0.0], ConstraintOp::Le, 3.0);

        let solution = CornerPointSolver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert!(solution.feasible_vertices.is_empty());
        assert_eq!(solution.optimal_vertex, None);
        assert_eq!(solution.optimal_value, f64::NEG_INFINITY);
    }

    #[test]
    fn test_infeasible_minimization_sentinel() {
        let mut problem = LpProblem::new(Objective::minimize(vec![1.0, 1.0]));
        problem.add_constraint(vec![1.0, 1.0], ConstraintOp::Le, -1.0);

        let solution = CornerPointSolver::new().solve(&problem).unwrap();
        assert_eq!(solution.optimal_vertex, None);
        assert_eq!(solution.optimal_value, f64::INFINITY);
    }

    #[test]
    fn test_equality_constraint_enforced() {
        // x1 + x2 = 4 keeps only the two intercepts
        let mut problem = LpProblem::new(Objective::maximize(vec![3.0, 2.0]));
        problem.add_constraint(vec![1.0, 1.0], ConstraintOp::Eq, 4.0);

        let solution = CornerPointSolver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(
            solution.feasible_vertices,
            vec![Point2D::new(0.0, 4.0), Point2D::new(4.0, 0.0)]
        );
        assert_eq!(solution.optimal_vertex, Some(Point2D::new(4.0, 0.0)));
        assert!((solution.optimal_value - 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_constraints_is_unbounded_at_origin() {
        let problem = LpProblem::new(Objective::maximize(vec![3.0, 2.0]));
        let solution = CornerPointSolver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Unbounded);
        assert_eq!(solution.feasible_vertices, vec![Point2D::new(0.0, 0.0)]);
        assert_eq!(solution.optimal_vertex, Some(Point2D::new(0.0, 0.0)));
        assert_eq!(solution.optimal_value, 0.0);
    }

    #[test]
    fn test_no_constraints_decreasing_objective_is_optimal() {
        let problem = LpProblem::new(Objective::maximize(vec![-1.0, -1.0]));
        let solution = CornerPointSolver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.optimal_vertex, Some(Point2D::new(0.0, 0.0)));
    }

    #[test]
    fn test_open_region_unbounded() {
        // x1 - x2 <= 2 leaves the region open along (1, 1)
        let mut problem = LpProblem::new(Objective::maximize(vec![1.0, 1.0]));
        problem.add_constraint(vec![1.0, -1.0], ConstraintOp::Le, 2.0);

        let solution = CornerPointSolver::new().solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Unbounded);
        assert_eq!(solution.optimal_vertex, Some(Point2D::new(2.0, 0.0)));
    }

    #[test]
    fn test_negative_intercepts_dropped() {
        // x1 - x2 >= -2 crosses the x axis at -2; that intercept is outside the quadrant
        let mut problem = LpProblem::new(Objective::maximize(vec![1.0, 1.0]));
        problem.add_constraint(vec![1.0, -1.0], ConstraintOp::Ge, -2.0);
        problem.add_constraint(vec![1.0, 1.0], ConstraintOp::Le, 6.0);

        let solution = CornerPointSolver::new().solve(&problem).unwrap();
        assert!(solution.feasible_vertices.iter().all(|p| p.x >= 0.0 && p.y >= 0.0));
        assert_eq!(
            solution.feasible_vertices,
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(0.0, 2.0),
                Point2D::new(2.0, 4.0),
                Point2D::new(6.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_tie_break_is_lexicographic() {
        // x1 + x2 is 4 at both (0,4) and (4,0); the first in sorted order wins
        let mut problem = LpProblem::new(Objective::maximize(vec![1.0, 1.0]));
        problem.add_constraint(vec![1.0, 1.0], ConstraintOp::Le, 4.0);

        let solution = CornerPointSolver::new().solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.optimal_vertex, Some(Point2D::new(0.0, 4.0)));
    }

    #[test]
    fn test_rounding_deduplicates() {
        // Two nearly coincident boundaries produce intersections that round together
        let mut problem = LpProblem::new(Objective::maximize(vec![1.0, 1.0]));
        problem.add_constraint(vec![1.0, 0.0], ConstraintOp::Le, 1.0);
        problem.add_constraint(vec![1.0, 0.0], ConstraintOp::Le, 1.001);
        problem.add_constraint(vec![0.0, 1.0], ConstraintOp::Le, 1.0);

        let solution = CornerPointSolver::new().solve(&problem).unwrap();
        assert_eq!(
            solution.feasible_vertices,
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(0.0, 1.0),
                Point2D::new(1.0, 0.0),
                Point2D::new(1.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_precision_controls_dedup() {
        let mut problem = LpProblem::new(Objective::maximize(vec![1.0, 1.0]));
        problem.add_constraint(vec![1.0, 0.0], ConstraintOp::Le, 1.0);
        problem.add_constraint(vec![1.0, 0.0], ConstraintOp::Le, 1.001);
        problem.add_constraint(vec![0.0, 1.0], ConstraintOp::Le, 1.0);

        let solution = CornerPointSolver::new().with_precision(3).solve(&problem).unwrap();
        assert_eq!(solution.feasible_vertices.len(), 6);
    }

    #[test]
    fn test_tolerance_controls_boundary_slack() {
        // (1.008, 0) overshoots x1 + x2 <= 1 by 0.008
        let mut problem = LpProblem::new(Objective::maximize(vec![1.0, 1.0]));
        problem.add_constraint(vec![1.0, 1.0], ConstraintOp::Le, 1.0);
        problem.add_constraint(vec![1.0, 0.0], ConstraintOp::Le, 1.008);

        let loose = CornerPointSolver::new().solve(&problem).unwrap();
        assert!(loose.feasible_vertices.contains(&Point2D::new(1.01, 0.0)));
        assert_eq!(loose.feasible_vertices.len(), 4);

        let tight = CornerPointSolver::new().with_tolerance(0.001).solve(&problem).unwrap();
        assert_eq!(
            tight.feasible_vertices,
            vec![Point2D::new(0.0, 0.0), Point2D::new(0.0, 1.0), Point2D::new(1.0, 0.0)]
        );
    }

    #[test]
    fn test_parallel_tolerance_skips_intersections() {
        // det of the two textbook boundaries is 3
        let solution = CornerPointSolver::new()
            .with_parallel_tolerance(10.0)
            .solve(&textbook_problem())
            .unwrap();
        assert!(!solution.feasible_vertices.contains(&Point2D::new(2.0, 4.0)));
        assert_eq!(solution.optimal_vertex, Some(Point2D::new(4.0, 0.0)));
        assert!((solution.optimal_value - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_three_variables_rejected() {
        let mut problem = textbook_problem();
        problem.add_constraint(vec![0.0, 0.0, 1.0], ConstraintOp::Le, 1.0);

        let err = CornerPointSolver::new().solve(&problem).unwrap_err();
        assert_eq!(err, SolveError::TooManyVariables(3));
    }

    #[test]
    fn test_deterministic() {
        let solver = CornerPointSolver::new();
        let problem = textbook_problem();
        assert_eq!(solver.solve(&problem).unwrap(), solver.solve(&problem).unwrap());
    }
}
