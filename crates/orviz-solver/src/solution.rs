#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// The best vertex is a true optimum
    Optimal,
    /// No candidate vertex satisfies every constraint
    Infeasible,
    /// The objective improves without bound along a feasible ray;
    /// the reported vertex is only the best corner
    Unbounded,
}

/// A corner of the feasible region
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Round both coordinates to `places` decimals; `-0.0` becomes `0.0`
    pub fn rounded(self, places: u32) -> Self {
        let scale = 10f64.powi(places as i32);
        let round = |v: f64| (v * scale).round() / scale + 0.0;
        Self::new(round(self.x), round(self.y))
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Result of the corner-point method
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    pub status: SolutionStatus,
    /// Feasible corners, deduplicated and sorted by `(x, y)`
    pub feasible_vertices: Vec<Point2D>,
    /// Best corner; `None` only when there is no feasible corner
    pub optimal_vertex: Option<Point2D>,
    /// Objective at the best corner, or the sense's worst value
    /// (`-inf` when maximizing) when infeasible
    pub optimal_value: f64,
}

impl LpSolution {
    pub fn infeasible(optimal_value: f64) -> Self {
        Self {
            status: SolutionStatus::Infeasible,
            feasible_vertices: Vec::new(),
            optimal_vertex: None,
            optimal_value,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.optimal_vertex.is_some()
    }
}

/// Units shipped from one source to one destination
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation {
    pub source: usize,
    pub destination: usize,
    pub amount: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TransportationSolution {
    /// Positive allocations in `(source, destination)` order
    pub allocations: Vec<Allocation>,
    pub total_cost: f64,
    /// Supply left at each source once demand ran out
    pub unallocated_supply: Vec<f64>,
    /// Demand left at each destination once supply ran out
    pub unallocated_demand: Vec<f64>,
}

impl TransportationSolution {
    pub fn total_allocated(&self) -> f64 {
        self.allocations.iter().map(|a| a.amount).sum()
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TspMethod {
    /// Every tour was enumerated; the result is optimal
    Exhaustive,
    /// Greedy nearest-neighbor tour; not guaranteed optimal
    NearestNeighbor,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TspSolution {
    /// City indices, starting and ending at 0
    pub tour: Vec<usize>,
    pub total_distance: f64,
    pub method: TspMethod,
    /// City labels in tour order, empty when no labels were given
    pub route: Vec<String>,
}
