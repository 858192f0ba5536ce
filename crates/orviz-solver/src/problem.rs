/// Smallest coefficient vector length; the geometric solver always works in the plane.
pub const MIN_VARIABLES: usize = 2;

/// Coefficients of a linear expression, indexed by variable number (0-based).
///
/// The vector is never shorter than [`MIN_VARIABLES`]; variables that were
/// never referenced hold `0.0`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Clone, PartialEq)]
pub struct LinearExpression {
    coefficients: Vec<f64>,
}

impl LinearExpression {
    pub fn new(mut coefficients: Vec<f64>) -> Self {
        if coefficients.len() < MIN_VARIABLES {
            coefficients.resize(MIN_VARIABLES, 0.0);
        }
        Self { coefficients }
    }

    /// Coefficient of the variable at `index`, zero when out of range
    pub fn coefficient(&self, index: usize) -> f64 {
        self.coefficients.get(index).copied().unwrap_or(0.0)
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Highest 1-based variable index with a non-zero coefficient
    pub fn highest_variable(&self) -> usize {
        self.coefficients
            .iter()
            .rposition(|&c| c != 0.0)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// Value of the first two variables' terms at `(x, y)`
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.coefficient(0) * x + self.coefficient(1) * y
    }
}

impl Default for LinearExpression {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<f64>> for LinearExpression {
    fn from(coefficients: Vec<f64>) -> Self {
        Self::new(coefficients)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sense {
    #[default]
    Maximize,
    Minimize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: LinearExpression,
    /// Whether to maximize or minimize
    pub sense: Sense,
}

impl Objective {
    pub fn maximize(coefficients: impl Into<LinearExpression>) -> Self {
        Self {
            coefficients: coefficients.into(),
            sense: Sense::Maximize,
        }
    }

    pub fn minimize(coefficients: impl Into<LinearExpression>) -> Self {
        Self {
            coefficients: coefficients.into(),
            sense: Sense::Minimize,
        }
    }

    /// True when `candidate` beats `incumbent` under this objective's sense
    pub fn improves(&self, candidate: f64, incumbent: f64) -> bool {
        match self.sense {
            Sense::Maximize => candidate > incumbent,
            Sense::Minimize => candidate < incumbent,
        }
    }

    /// Value reported when there is nothing to evaluate
    pub fn worst_value(&self) -> f64 {
        match self.sense {
            Sense::Maximize => f64::NEG_INFINITY,
            Sense::Minimize => f64::INFINITY,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Coefficients for each variable
    pub coefficients: LinearExpression,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

impl Constraint {
    pub fn new(coefficients: impl Into<LinearExpression>, op: ConstraintOp, rhs: f64) -> Self {
        Self {
            coefficients: coefficients.into(),
            op,
            rhs,
        }
    }

    /// Whether `(x, y)` satisfies the constraint within `tolerance`
    pub fn is_satisfied(&self, x: f64, y: f64, tolerance: f64) -> bool {
        let value = self.coefficients.evaluate(x, y);
        match self.op {
            ConstraintOp::Le => value <= self.rhs + tolerance,
            ConstraintOp::Ge => value >= self.rhs - tolerance,
            ConstraintOp::Eq => (value - self.rhs).abs() <= tolerance,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    #[cfg_attr(feature = "serde", serde(rename = "<="))]
    Le,
    /// Greater than or equal (>=)
    #[cfg_attr(feature = "serde", serde(rename = ">="))]
    Ge,
    /// Equal (=)
    #[cfg_attr(feature = "serde", serde(rename = "="))]
    Eq,
}

impl ConstraintOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ConstraintOp::Le => "<=",
            ConstraintOp::Ge => ">=",
            ConstraintOp::Eq => "=",
        }
    }
}

/// A two-variable linear program solved by corner-point enumeration
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    pub objective: Objective,
    pub constraints: Vec<Constraint>,
}

impl LpProblem {
    pub fn new(objective: Objective) -> Self {
        Self {
            objective,
            constraints: Vec::new(),
        }
    }

    pub fn add_constraint(&mut self, coefficients: impl Into<LinearExpression>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint::new(coefficients, op, rhs));
    }

    /// Highest variable index referenced anywhere in the problem
    pub fn num_variables(&self) -> usize {
        self.constraints
            .iter()
            .map(|c| c.coefficients.highest_variable())
            .chain(std::iter::once(self.objective.coefficients.highest_variable()))
            .max()
            .unwrap_or(0)
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}

/// Supply/demand allocation problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TransportationProblem {
    /// Units available at each source
    pub supply: Vec<f64>,
    /// Units required at each destination
    pub demand: Vec<f64>,
    /// `costs[i][j]` is the unit cost from source `i` to destination `j`
    pub costs: Vec<Vec<f64>>,
}

impl TransportationProblem {
    pub fn new(supply: Vec<f64>, demand: Vec<f64>, costs: Vec<Vec<f64>>) -> Self {
        Self { supply, demand, costs }
    }

    pub fn total_supply(&self) -> f64 {
        self.supply.iter().sum()
    }

    pub fn total_demand(&self) -> f64 {
        self.demand.iter().sum()
    }

    pub fn is_balanced(&self) -> bool {
        (self.total_supply() - self.total_demand()).abs() < 1e-9
    }
}

/// Traveling salesman instance over a (possibly asymmetric) distance matrix
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TspProblem {
    pub city_labels: Vec<String>,
    pub distances: Vec<Vec<f64>>,
}

impl TspProblem {
    pub fn new(city_labels: Vec<String>, distances: Vec<Vec<f64>>) -> Self {
        Self { city_labels, distances }
    }

    pub fn num_cities(&self) -> usize {
        self.distances.len()
    }
}
