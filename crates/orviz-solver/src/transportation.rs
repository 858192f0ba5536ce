use log::{debug, warn};

use crate::error::{SolveError, check_values};
use crate::problem::TransportationProblem;
use crate::solution::{Allocation, TransportationSolution};

/// Allocate supply to demand with Vogel's Approximation Method
///
/// The allocation is the VAM starting solution, used as-is; it is usually
/// close to the least-cost plan but not guaranteed optimal. Unbalanced input
/// is accepted and whatever cannot be shipped is reported as unallocated.
pub fn solve_transportation(
    supply: &[f64],
    demand: &[f64],
    costs: &[Vec<f64>],
) -> Result<TransportationSolution, SolveError> {
    validate(supply, demand, costs)?;

    let (m, n) = (supply.len(), demand.len());
    let mut supply_left = supply.to_vec();
    let mut demand_left = demand.to_vec();
    let mut allocation = vec![vec![0.0; n]; m];
    // Remainders at or below this are rounding error and count as exhausted
    let dust = 1e-9 * supply.iter().sum::<f64>().max(demand.iter().sum::<f64>());

    while supply_left.iter().any(|&s| s > 0.0) && demand_left.iter().any(|&d| d > 0.0) {
        let Some(line) = select_line(costs, &supply_left, &demand_left) else {
            break;
        };

        let (i, j) = match line {
            Line::Row(i) => (i, cheapest(n, |j| demand_left[j] > 0.0, |j| costs[i][j])),
            Line::Column(j) => (cheapest(m, |i| supply_left[i] > 0.0, |i| costs[i][j]), j),
        };

        let amount = supply_left[i].min(demand_left[j]);
        debug!("vam: {:?} -> cell ({}, {}) gets {}", line, i, j, amount);
        allocation[i][j] += amount;
        supply_left[i] -= amount;
        demand_left[j] -= amount;
        if supply_left[i] <= dust {
            supply_left[i] = 0.0;
        }
        if demand_left[j] <= dust {
            demand_left[j] = 0.0;
        }
    }

    let mut allocations = Vec::new();
    let mut total_cost = 0.0;
    for (i, row) in allocation.iter().enumerate() {
        for (j, &amount) in row.iter().enumerate() {
            if amount > 0.0 {
                total_cost += amount * costs[i][j];
                allocations.push(Allocation {
                    source: i,
                    destination: j,
                    amount,
                });
            }
        }
    }

    let residual_supply: f64 = supply_left.iter().sum();
    let residual_demand: f64 = demand_left.iter().sum();
    if residual_supply > 0.0 || residual_demand > 0.0 {
        warn!(
            "unbalanced transportation problem: {} supply and {} demand left unallocated",
            residual_supply, residual_demand
        );
    }

    Ok(TransportationSolution {
        allocations,
        total_cost,
        unallocated_supply: supply_left,
        unallocated_demand: demand_left,
    })
}

impl TransportationProblem {
    pub fn solve(&self) -> Result<TransportationSolution, SolveError> {
        solve_transportation(&self.supply, &self.demand, &self.costs)
    }
}

fn validate(supply: &[f64], demand: &[f64], costs: &[Vec<f64>]) -> Result<(), SolveError> {
    check_values("supply", supply, false)?;
    check_values("demand", demand, false)?;

    if supply.is_empty() || demand.is_empty() {
        // Nothing can be shipped; the cost matrix is irrelevant
        return Ok(());
    }

    if costs.len() != supply.len() {
        return Err(SolveError::CostRowCount {
            expected: supply.len(),
            found: costs.len(),
        });
    }
    for (row, entries) in costs.iter().enumerate() {
        if entries.len() != demand.len() {
            return Err(SolveError::CostColumnCount {
                row,
                expected: demand.len(),
                found: entries.len(),
            });
        }
        check_values("costs", entries, false)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line {
    Row(usize),
    Column(usize),
}

/// Line with the highest penalty; rows are scanned before columns and the
/// first maximum wins
fn select_line(costs: &[Vec<f64>], supply_left: &[f64], demand_left: &[f64]) -> Option<Line> {
    let (m, n) = (supply_left.len(), demand_left.len());

    let rows = (0..m).filter(|&i| supply_left[i] > 0.0).filter_map(|i| {
        let eligible = (0..n).filter(|&j| demand_left[j] > 0.0).map(|j| costs[i][j]);
        penalty(eligible).map(|p| (p, Line::Row(i)))
    });
    let columns = (0..n).filter(|&j| demand_left[j] > 0.0).filter_map(|j| {
        let eligible = (0..m).filter(|&i| supply_left[i] > 0.0).map(|i| costs[i][j]);
        penalty(eligible).map(|p| (p, Line::Column(j)))
    });

    let mut best: Option<(f64, Line)> = None;
    for (p, line) in rows.chain(columns) {
        if best.is_none_or(|(incumbent, _)| p > incumbent) {
            best = Some((p, line));
        }
    }
    best.map(|(_, line)| line)
}

/// Second-smallest minus smallest cost; zero with one entry, none with no entries
fn penalty(costs: impl Iterator<Item = f64>) -> Option<f64> {
    let mut smallest = f64::INFINITY;
    let mut second = f64::INFINITY;
    let mut count = 0;
    for c in costs {
        count += 1;
        if c < smallest {
            second = smallest;
            smallest = c;
        } else if c < second {
            second = c;
        }
    }
    match count {
        0 => None,
        1 => Some(0.0),
        _ => Some(second - smallest),
    }
}

/// Lowest-index eligible position with the minimum cost
fn cheapest(len: usize, eligible: impl Fn(usize) -> bool, cost: impl Fn(usize) -> f64) -> usize {
    let mut best = None;
    let mut min_cost = f64::INFINITY;
    for k in (0..len).filter(|&k| eligible(k)) {
        if best.is_none() || cost(k) < min_cost {
            min_cost = cost(k);
            best = Some(k);
        }
    }
    // select_line only returns lines with at least one eligible partner
    best.unwrap_or_default()
}
