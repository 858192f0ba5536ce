use itertools::Itertools;
use log::{debug, warn};

use crate::error::{SolveError, check_values};
use crate::problem::TspProblem;
use crate::solution::{TspMethod, TspSolution};

/// Largest instance searched exhaustively. The search enumerates
/// `(n - 1)!` tours, so raising this requires a new runtime bound.
pub const EXHAUSTIVE_LIMIT: usize = 10;

/// Traveling salesman solver: exact for small instances, nearest neighbor otherwise
pub struct TspSolver {
    exhaustive_limit: usize,
}

impl Default for TspSolver {
    fn default() -> Self {
        Self {
            exhaustive_limit: EXHAUSTIVE_LIMIT,
        }
    }
}

impl TspSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower the exhaustive-search cutoff. Values above [`EXHAUSTIVE_LIMIT`]
    /// are clamped to it.
    pub fn with_exhaustive_limit(mut self, limit: usize) -> Self {
        self.exhaustive_limit = limit.min(EXHAUSTIVE_LIMIT);
        self
    }

    /// Solve and attach city labels to the tour
    pub fn solve(&self, problem: &TspProblem) -> Result<TspSolution, SolveError> {
        let n = problem.num_cities();
        if !problem.city_labels.is_empty() && problem.city_labels.len() != n {
            return Err(SolveError::LabelCountMismatch {
                labels: problem.city_labels.len(),
                cities: n,
            });
        }

        let mut solution = self.solve_distances(&problem.distances)?;
        if !problem.city_labels.is_empty() {
            solution.route = solution
                .tour
                .iter()
                .map(|&city| problem.city_labels[city].clone())
                .collect();
        }
        Ok(solution)
    }

    pub fn solve_distances(&self, distances: &[Vec<f64>]) -> Result<TspSolution, SolveError> {
        validate(distances)?;
        let n = distances.len();

        if n == 1 {
            return Ok(TspSolution {
                tour: vec![0, 0],
                total_distance: 0.0,
                method: TspMethod::Exhaustive,
                route: Vec::new(),
            });
        }

        if n <= self.exhaustive_limit {
            Ok(exhaustive(distances))
        } else {
            warn!("{} cities exceed the exhaustive limit; using nearest neighbor", n);
            Ok(nearest_neighbor(distances))
        }
    }
}

/// Solve with the default cutoff
pub fn solve_tsp(distances: &[Vec<f64>]) -> Result<TspSolution, SolveError> {
    TspSolver::new().solve_distances(distances)
}

fn validate(distances: &[Vec<f64>]) -> Result<(), SolveError> {
    let n = distances.len();
    if n == 0 {
        return Err(SolveError::EmptyDistanceMatrix);
    }
    for (row, entries) in distances.iter().enumerate() {
        if entries.len() != n {
            return Err(SolveError::NonSquareMatrix {
                row,
                expected: n,
                found: entries.len(),
            });
        }
        check_values("distances", entries, true)?;
    }
    Ok(())
}

fn tour_length(distances: &[Vec<f64>], tour: &[usize]) -> f64 {
    tour.windows(2).map(|leg| distances[leg[0]][leg[1]]).sum()
}

/// Every ordering of cities `1..n` in lexicographic order; the first
/// strictly shortest tour wins
fn exhaustive(distances: &[Vec<f64>]) -> TspSolution {
    let n = distances.len();
    let mut best_tour = Vec::new();
    let mut best_distance = f64::INFINITY;
    let mut evaluated = 0usize;

    for perm in (1..n).permutations(n - 1) {
        let tour: Vec<usize> = std::iter::once(0).chain(perm).chain(std::iter::once(0)).collect();
        let distance = tour_length(distances, &tour);
        evaluated += 1;
        if distance < best_distance {
            best_distance = distance;
            best_tour = tour;
        }
    }

    debug!("tsp: evaluated {} tours, best {}", evaluated, best_distance);
    TspSolution {
        tour: best_tour,
        total_distance: best_distance,
        method: TspMethod::Exhaustive,
        route: Vec::new(),
    }
}

/// Greedy tour from city 0; ties go to the lowest index
fn nearest_neighbor(distances: &[Vec<f64>]) -> TspSolution {
    let n = distances.len();
    let mut visited = vec![false; n];
    let mut tour = Vec::with_capacity(n + 1);
    let mut current = 0;
    let mut total_distance = 0.0;

    visited[0] = true;
    tour.push(0);

    while tour.len() < n {
        let mut nearest = None;
        let mut nearest_dist = f64::INFINITY;
        for (city, &dist) in distances[current].iter().enumerate() {
            if !visited[city] && (nearest.is_none() || dist < nearest_dist) {
                nearest = Some(city);
                nearest_dist = dist;
            }
        }
        let Some(next) = nearest else {
            break;
        };
        visited[next] = true;
        tour.push(next);
        total_distance += nearest_dist;
        current = next;
    }

    total_distance += distances[current][0];
    tour.push(0);

    TspSolution {
        tour,
        total_distance,
        method: TspMethod::NearestNeighbor,
        route: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 10.0, 15.0, 20.0],
            vec![10.0, 0.0, 35.0, 25.0],
            vec![15.0, 35.0, 0.0, 30.0],
            vec![20.0, 25.0, 30.0, 0.0],
        ]
    }

    /// Points on a line at the given positions, distance = |a - b|
    fn line_matrix(positions: &[f64]) -> Vec<Vec<f64>> {
        positions
            .iter()
            .map(|a| positions.iter().map(|b| (a - b).abs()).collect())
            .collect()
    }

    #[test]
    fn test_sample_exhaustive() {
        let solution = solve_tsp(&sample()).unwrap();

        // [1, 3, 2] is the first ordering reaching the minimum of 80
        assert_eq!(solution.tour, vec![0, 1, 3, 2, 0]);
        assert!((solution.total_distance - 80.0).abs() < 1e-9);
        assert_eq!(solution.method, TspMethod::Exhaustive);
    }

    #[test]
    fn test_exhaustive_matches_brute_force() {
        let distances = sample();
        let brute = [[1, 2, 3], [1, 3, 2], [2, 1, 3], [2, 3, 1], [3, 1, 2], [3, 2, 1]]
            .iter()
            .map(|p| {
                distances[0][p[0]] + distances[p[0]][p[1]] + distances[p[1]][p[2]] + distances[p[2]][0]
            })
            .fold(f64::INFINITY, f64::min);

        let solution = solve_tsp(&distances).unwrap();
        assert_eq!(brute, 80.0);
        assert_eq!(solution.total_distance, brute);
    }

    #[test]
    fn test_exhaustive_never_worse_than_greedy() {
        let distances = sample();
        let exact = solve_tsp(&distances).unwrap();
        let greedy = nearest_neighbor(&distances);
        assert!(exact.total_distance <= greedy.total_distance);

        // A matrix where the greedy tour is strictly worse
        let trap = vec![
            vec![0.0, 1.0, 5.0, 1.0],
            vec![1.0, 0.0, 1.0, 5.0],
            vec![5.0, 1.0, 0.0, 10.0],
            vec![1.0, 5.0, 10.0, 0.0],
        ];
        let exact = solve_tsp(&trap).unwrap();
        let greedy = nearest_neighbor(&trap);
        assert_eq!(exact.tour, vec![0, 2, 1, 3, 0]);
        assert_eq!(exact.total_distance, 12.0);
        assert_eq!(greedy.tour, vec![0, 1, 2, 3, 0]);
        assert_eq!(greedy.total_distance, 13.0);
    }

    #[test]
    fn test_single_city() {
        let solution = solve_tsp(&[vec![5.0]]).unwrap();
        assert_eq!(solution.tour, vec![0, 0]);
        assert_eq!(solution.total_distance, 0.0);
    }

    #[test]
    fn test_two_cities() {
        let solution = solve_tsp(&[vec![0.0, 3.0], vec![4.0, 0.0]]).unwrap();
        assert_eq!(solution.tour, vec![0, 1, 0]);
        assert_eq!(solution.total_distance, 7.0);
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(solve_tsp(&[]).unwrap_err(), SolveError::EmptyDistanceMatrix);
    }

    #[test]
    fn test_non_square_rejected() {
        let err = solve_tsp(&[vec![0.0, 1.0], vec![1.0]]).unwrap_err();
        assert_eq!(
            err,
            SolveError::NonSquareMatrix {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_nearest_neighbor_above_limit() {
        let positions: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let solution = solve_tsp(&line_matrix(&positions)).unwrap();

        assert_eq!(solution.method, TspMethod::NearestNeighbor);
        let mut expected: Vec<usize> = (0..12).collect();
        expected.push(0);
        assert_eq!(solution.tour, expected);
        assert_eq!(solution.total_distance, 22.0);
    }

    #[test]
    fn test_nearest_neighbor_tie_prefers_lowest_index() {
        // Cities 1 and 2 are both at distance 1 from city 0
        let distances = vec![
            vec![0.0, 1.0, 1.0],
            vec![1.0, 0.0, 2.0],
            vec![1.0, 2.0, 0.0],
        ];
        let solution = nearest_neighbor(&distances);
        assert_eq!(solution.tour, vec![0, 1, 2, 0]);
        assert_eq!(solution.total_distance, 4.0);
    }

    #[test]
    fn test_exhaustive_limit_lowered() {
        let solver = TspSolver::new().with_exhaustive_limit(3);
        let solution = solver.solve_distances(&sample()).unwrap();
        assert_eq!(solution.method, TspMethod::NearestNeighbor);
        assert_eq!(solution.tour, vec![0, 1, 3, 2, 0]);
        assert_eq!(solution.total_distance, 80.0);
    }

    #[test]
    fn test_labels_attached() {
        let problem = TspProblem::new(
            vec!["A".into(), "B".into(), "C".into(), "D".into()],
            sample(),
        );
        let solution = TspSolver::new().solve(&problem).unwrap();
        assert_eq!(solution.route, vec!["A", "B", "D", "C", "A"]);
    }

    #[test]
    fn test_label_mismatch() {
        let problem = TspProblem::new(vec!["A".into()], sample());
        let err = TspSolver::new().solve(&problem).unwrap_err();
        assert_eq!(err, SolveError::LabelCountMismatch { labels: 1, cities: 4 });
    }

    #[test]
    fn test_deterministic() {
        let distances = sample();
        assert_eq!(solve_tsp(&distances).unwrap(), solve_tsp(&distances).unwrap());
    }
}
