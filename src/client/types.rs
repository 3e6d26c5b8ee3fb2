//! Optimization Service Data Types
//!
//! Request and response shapes exchanged with the optimization service.
//! These are plain data-transfer records: nothing here validates expression
//! syntax, bounds, or feasibility. The remote service owns those checks.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Decision variable domain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    #[default]
    Continuous,
    Integer,
    Binary,
}

/// Decision variable in an optimization problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Variable name (unique within a problem)
    pub name: String,

    /// Variable domain
    #[serde(rename = "type", default)]
    pub kind: VariableKind,

    /// Lower bound (not checked against `upper_bound` locally)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<f64>,

    /// Upper bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Variable {
    fn with_kind(name: impl Into<String>, kind: VariableKind) -> Self {
        Self {
            name: name.into(),
            kind,
            lower_bound: None,
            upper_bound: None,
            description: None,
        }
    }

    pub fn continuous(name: impl Into<String>) -> Self {
        Self::with_kind(name, VariableKind::Continuous)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::with_kind(name, VariableKind::Integer)
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self::with_kind(name, VariableKind::Binary)
    }

    pub fn with_bounds(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Optimization direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveSense {
    Maximize,
    Minimize,
}

/// Objective function
///
/// The canonical wire field is `sense`; `type` is accepted on input because
/// older tool schemas used that name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    #[serde(alias = "type")]
    pub sense: ObjectiveSense,

    /// Linear expression, e.g. `3*x + 2*y`
    pub expression: String,
}

impl Objective {
    pub fn maximize(expression: impl Into<String>) -> Self {
        Self {
            sense: ObjectiveSense::Maximize,
            expression: expression.into(),
        }
    }

    pub fn minimize(expression: impl Into<String>) -> Self {
        Self {
            sense: ObjectiveSense::Minimize,
            expression: expression.into(),
        }
    }
}

/// Relation kind of a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    Equality,
    Inequality,
}

/// Linear constraint, e.g. `x + y <= 10`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub expression: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ConstraintKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Constraint {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            kind: None,
            description: None,
        }
    }

    pub fn equality(mut self) -> Self {
        self.kind = Some(ConstraintKind::Equality);
        self
    }

    pub fn inequality(mut self) -> Self {
        self.kind = Some(ConstraintKind::Inequality);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Linear or mixed-integer program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearProblem {
    pub variables: Vec<Variable>,

    pub objective: Objective,

    #[serde(default)]
    pub constraints: Vec<Constraint>,

    /// Solver time limit in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,

    /// Ask the service to render an HTML report (defaults to true on send)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_report: Option<bool>,
}

/// Linear program (all variables continuous)
pub type LpProblem = LinearProblem;

/// Mixed-integer program
pub type MipProblem = LinearProblem;

impl LinearProblem {
    pub fn new(variables: Vec<Variable>, objective: Objective) -> Self {
        Self {
            variables,
            objective,
            constraints: Vec::new(),
            timeout: None,
            generate_report: None,
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn with_report(mut self, generate: bool) -> Self {
        self.generate_report = Some(generate);
        self
    }
}

/// A stop on a TSP tour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// Traveling salesman problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TspProblem {
    pub locations: Vec<Location>,

    /// Name of the location the tour starts from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_to_start: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_report: Option<bool>,
}

impl TspProblem {
    pub fn new(locations: Vec<Location>) -> Self {
        Self {
            locations,
            start_location: None,
            return_to_start: None,
            timeout: None,
            generate_report: None,
        }
    }

    pub fn starting_at(mut self, name: impl Into<String>) -> Self {
        self.start_location = Some(name.into());
        self
    }
}

/// Result of an LP or MIP solve
///
/// Unrecognised fields returned by the service are kept in `extra` so no
/// metadata is dropped on the way to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResponse {
    /// Free-form status such as `OPTIMAL` or `INFEASIBLE`
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective_value: Option<f64>,

    /// Variable name to value, kept as sent (integers stay integers, `null` is allowed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<BTreeMap<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,

    /// Solve time in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One leg of a TSP tour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub from: String,
    pub to: String,

    /// Leg length in meters
    pub distance: f64,
}

/// Result of a TSP solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TspResponse {
    pub status: String,

    /// Total tour length in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective_value: Option<f64>,

    /// Location names in visiting order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<RouteSegment>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /api/analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub description: String,
}

/// Natural-language problem analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Detected problem class, e.g. `LP`, `MIP`, `TSP`
    pub problem_type: String,

    /// Detection confidence in `0.0..=1.0`
    #[serde(default)]
    pub confidence: f64,

    #[serde(default)]
    pub variables: Vec<String>,

    #[serde(default)]
    pub constraints: Vec<String>,

    #[serde(default)]
    pub recommendations: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Entry of the report listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Paginated envelope returned by `GET /api/reports`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportList {
    pub reports: Vec<ReportSummary>,

    #[serde(default)]
    pub total: usize,
}
