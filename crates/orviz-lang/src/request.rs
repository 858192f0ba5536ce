//! Tagged problem payloads and their solved responses
//!
//! A payload is a JSON object whose `type` field is `standard` (a
//! two-variable LP), `transportation` or `tsp`. A missing `type` means
//! `standard`.

use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use orviz_solver::{
    Constraint, CornerPointSolver, LpSolution, Objective, SolveError, TransportationProblem, TransportationSolution,
    TspProblem, TspSolution, TspSolver,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::compiler::{CompileError, Compiler};

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Payload must be a JSON object")]
    NotAnObject,
    #[error("Invalid problem type: {0}")]
    UnknownProblemType(String),
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    #[error("Invalid field {field}: {source}")]
    InvalidField {
        field: &'static str,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Solve(#[from] SolveError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemKind {
    Standard,
    Transportation,
    Tsp,
}

impl ProblemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProblemKind::Standard => "standard",
            ProblemKind::Transportation => "transportation",
            ProblemKind::Tsp => "tsp",
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProblemKind {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(ProblemKind::Standard),
            "transportation" => Ok(ProblemKind::Transportation),
            "tsp" => Ok(ProblemKind::Tsp),
            other => Err(RequestError::UnknownProblemType(other.to_string())),
        }
    }
}

/// What to do when a payload omits a problem field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultPolicy {
    /// Reject the payload
    #[default]
    Strict,
    /// Take the field from the built-in sample problem
    FillMissing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardRequest {
    pub objective: String,
    pub constraints: Vec<String>,
}

impl StandardRequest {
    pub fn sample() -> Self {
        Self {
            objective: "3x1 + 2x2".to_string(),
            constraints: vec!["2x1 + x2 <= 8".to_string(), "x1 + 2x2 <= 10".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportationRequest {
    pub supply: Vec<f64>,
    pub demand: Vec<f64>,
    pub costs: Vec<Vec<f64>>,
}

impl TransportationRequest {
    pub fn sample() -> Self {
        Self {
            supply: vec![20.0, 30.0, 25.0],
            demand: vec![15.0, 25.0, 35.0],
            costs: vec![
                vec![8.0, 6.0, 10.0],
                vec![9.0, 12.0, 13.0],
                vec![14.0, 9.0, 16.0],
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TspRequest {
    pub cities: Vec<String>,
    pub distances: Vec<Vec<f64>>,
}

impl TspRequest {
    pub fn sample() -> Self {
        Self {
            cities: ["A", "B", "C", "D"].iter().map(|c| c.to_string()).collect(),
            distances: vec![
                vec![0.0, 10.0, 15.0, 20.0],
                vec![10.0, 0.0, 35.0, 25.0],
                vec![15.0, 35.0, 0.0, 30.0],
                vec![20.0, 25.0, 30.0, 0.0],
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Request {
    Standard(StandardRequest),
    Transportation(TransportationRequest),
    Tsp(TspRequest),
}

impl Request {
    pub fn sample(kind: ProblemKind) -> Self {
        match kind {
            ProblemKind::Standard => Request::Standard(StandardRequest::sample()),
            ProblemKind::Transportation => Request::Transportation(TransportationRequest::sample()),
            ProblemKind::Tsp => Request::Tsp(TspRequest::sample()),
        }
    }

    pub fn kind(&self) -> ProblemKind {
        match self {
            Request::Standard(_) => ProblemKind::Standard,
            Request::Transportation(_) => ProblemKind::Transportation,
            Request::Tsp(_) => ProblemKind::Tsp,
        }
    }

    pub fn from_json(source: &str, policy: DefaultPolicy) -> Result<Self, RequestError> {
        let value: Value = serde_json::from_str(source)?;
        Self::from_value(value, policy)
    }

    /// Read a payload, applying `policy` to absent fields
    pub fn from_value(value: Value, policy: DefaultPolicy) -> Result<Self, RequestError> {
        let Value::Object(mut map) = value else {
            return Err(RequestError::NotAnObject);
        };

        let kind = match map.remove("type") {
            None | Some(Value::Null) => ProblemKind::Standard,
            Some(Value::String(tag)) => tag.parse()?,
            Some(other) => return Err(RequestError::UnknownProblemType(other.to_string())),
        };

        let request = match kind {
            ProblemKind::Standard => {
                let sample = StandardRequest::sample();
                Request::Standard(StandardRequest {
                    objective: take_field(&mut map, "objective", policy, sample.objective)?,
                    constraints: take_field(&mut map, "constraints", policy, sample.constraints)?,
                })
            }
            ProblemKind::Transportation => {
                let sample = TransportationRequest::sample();
                Request::Transportation(TransportationRequest {
                    supply: take_field(&mut map, "supply", policy, sample.supply)?,
                    demand: take_field(&mut map, "demand", policy, sample.demand)?,
                    costs: take_field(&mut map, "costs", policy, sample.costs)?,
                })
            }
            ProblemKind::Tsp => {
                let sample = TspRequest::sample();
                Request::Tsp(TspRequest {
                    cities: take_field(&mut map, "cities", policy, sample.cities)?,
                    distances: take_field(&mut map, "distances", policy, sample.distances)?,
                })
            }
        };

        if !map.is_empty() {
            debug!("ignoring unknown fields: {:?}", map.keys().collect::<Vec<_>>());
        }
        Ok(request)
    }

    pub fn solve(&self) -> Result<Response, RequestError> {
        info!("solving {} problem", self.kind());
        let response = match self {
            Request::Standard(req) => {
                let problem = Compiler::compile_lp(&req.objective, &req.constraints)?;
                let solution = CornerPointSolver::new().solve(&problem)?;
                Response::Standard(LpResponse {
                    objective: problem.objective,
                    constraints: problem.constraints,
                    solution,
                })
            }
            Request::Transportation(req) => {
                let problem = TransportationProblem::new(req.supply.clone(), req.demand.clone(), req.costs.clone());
                Response::Transportation(problem.solve()?)
            }
            Request::Tsp(req) => {
                let problem = TspProblem::new(req.cities.clone(), req.distances.clone());
                Response::Tsp(TspSolver::new().solve(&problem)?)
            }
        };
        Ok(response)
    }
}

fn take_field<T: DeserializeOwned>(
    map: &mut Map<String, Value>,
    field: &'static str,
    policy: DefaultPolicy,
    default: T,
) -> Result<T, RequestError> {
    match map.remove(field) {
        Some(Value::Null) | None => match policy {
            DefaultPolicy::Strict => Err(RequestError::MissingField(field)),
            DefaultPolicy::FillMissing => {
                debug!("field {} missing, using sample value", field);
                Ok(default)
            }
        },
        Some(value) => serde_json::from_value(value).map_err(|source| RequestError::InvalidField { field, source }),
    }
}

/// LP result together with the parsed model, so boundary lines can be drawn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LpResponse {
    pub objective: Objective,
    pub constraints: Vec<Constraint>,
    #[serde(flatten)]
    pub solution: LpSolution,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Response {
    Standard(LpResponse),
    Transportation(TransportationSolution),
    Tsp(TspSolution),
}

impl Response {
    pub fn kind(&self) -> ProblemKind {
        match self {
            Response::Standard(_) => ProblemKind::Standard,
            Response::Transportation(_) => ProblemKind::Transportation,
            Response::Tsp(_) => ProblemKind::Tsp,
        }
    }
}
