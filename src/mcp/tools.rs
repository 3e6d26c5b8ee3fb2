//! Tool Declarations
//!
//! Each façade operation is exposed as an MCP tool with a JSON Schema input
//! contract. Incoming arguments are validated once here, by deserializing
//! into [`ToolCall`]; everything past this point works with typed values.

use crate::client::types::{LpProblem, MipProblem, TspProblem};
use crate::error::ToolError;
use crate::mcp::protocol::Tool;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

pub const SOLVE_LP: &str = "solve_lp";
pub const SOLVE_MIP: &str = "solve_mip";
pub const SOLVE_TSP: &str = "solve_tsp";
pub const ANALYZE_PROBLEM: &str = "analyze_problem";
pub const GET_REPORT: &str = "get_report";

/// Names of all declared tools, in discovery order
pub const TOOL_NAMES: [&str; 5] = [SOLVE_LP, SOLVE_MIP, SOLVE_TSP, ANALYZE_PROBLEM, GET_REPORT];

/// A validated tool invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    SolveLp(LpProblem),
    SolveMip(MipProblem),
    SolveTsp(TspProblem),
    AnalyzeProblem { description: String },
    GetReport { report_id: String },
}

#[derive(Deserialize)]
struct AnalyzeArgs {
    description: String,
}

#[derive(Deserialize)]
struct ReportArgs {
    report_id: String,
}

impl ToolCall {
    /// Validate a named invocation against its input contract
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] for undeclared names and
    /// [`ToolError::InvalidArguments`] when the arguments do not fit the schema.
    pub fn parse(name: &str, arguments: Value) -> Result<Self, ToolError> {
        // Missing arguments are treated as an empty object so the error names the field
        let arguments = match arguments {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        match name {
            SOLVE_LP => parse_args(name, arguments).map(Self::SolveLp),
            SOLVE_MIP => parse_args(name, arguments).map(Self::SolveMip),
            SOLVE_TSP => parse_args(name, arguments).map(Self::SolveTsp),
            ANALYZE_PROBLEM => parse_args::<AnalyzeArgs>(name, arguments).map(|args| {
                Self::AnalyzeProblem {
                    description: args.description,
                }
            }),
            GET_REPORT => parse_args::<ReportArgs>(name, arguments).map(|args| Self::GetReport {
                report_id: args.report_id,
            }),
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    /// Tool name of this invocation
    pub fn name(&self) -> &'static str {
        match self {
            Self::SolveLp(_) => SOLVE_LP,
            Self::SolveMip(_) => SOLVE_MIP,
            Self::SolveTsp(_) => SOLVE_TSP,
            Self::AnalyzeProblem { .. } => ANALYZE_PROBLEM,
            Self::GetReport { .. } => GET_REPORT,
        }
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

/// All tool declarations, as returned by `tools/list`
pub fn tool_definitions() -> Vec<Tool> {
    vec![
        Tool {
            name: SOLVE_LP.to_string(),
            description: "Solve a linear programming problem with continuous variables. \
                Returns the status, objective value and variable assignment."
                .to_string(),
            input_schema: linear_problem_schema(),
        },
        Tool {
            name: SOLVE_MIP.to_string(),
            description: "Solve a mixed-integer programming problem. Variables may be \
                continuous, integer or binary."
                .to_string(),
            input_schema: linear_problem_schema(),
        },
        Tool {
            name: SOLVE_TSP.to_string(),
            description: "Find the shortest closed tour visiting every location \
                (traveling salesman problem). Distances are reported in kilometers."
                .to_string(),
            input_schema: tsp_problem_schema(),
        },
        Tool {
            name: ANALYZE_PROBLEM.to_string(),
            description: "Analyze a natural-language problem description and suggest \
                a problem type, variables, constraints and modelling recommendations."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "description": {
                        "type": "string",
                        "description": "Plain-language description of the optimization problem"
                    }
                },
                "required": ["description"]
            }),
        },
        Tool {
            name: GET_REPORT.to_string(),
            description: "Retrieve the HTML report generated for a previous solve.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "report_id": {
                        "type": "string",
                        "description": "Report identifier returned by a solve tool"
                    }
                },
                "required": ["report_id"]
            }),
        },
    ]
}

fn linear_problem_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "variables": {
                "type": "array",
                "description": "Decision variables",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "type": {
                            "type": "string",
                            "enum": ["continuous", "integer", "binary"],
                            "default": "continuous"
                        },
                        "lower_bound": {"type": "number"},
                        "upper_bound": {"type": "number"},
                        "description": {"type": "string"}
                    },
                    "required": ["name"]
                }
            },
            "objective": {
                "type": "object",
                "properties": {
                    "sense": {"type": "string", "enum": ["maximize", "minimize"]},
                    "expression": {
                        "type": "string",
                        "description": "Linear expression, e.g. 3*x + 2*y"
                    }
                },
                "required": ["sense", "expression"]
            },
            "constraints": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "expression": {
                            "type": "string",
                            "description": "Linear constraint, e.g. x + y <= 10"
                        },
                        "type": {"type": "string", "enum": ["equality", "inequality"]},
                        "description": {"type": "string"}
                    },
                    "required": ["expression"]
                }
            },
            "timeout": {
                "type": "number",
                "description": "Solver time limit in seconds"
            },
            "generate_report": {
                "type": "boolean",
                "description": "Generate an HTML report",
                "default": true
            }
        },
        "required": ["variables", "objective"]
    })
}

fn tsp_problem_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "locations": {
                "type": "array",
                "description": "Locations to visit",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "latitude": {"type": "number"},
                        "longitude": {"type": "number"}
                    },
                    "required": ["name", "latitude", "longitude"]
                }
            },
            "start_location": {
                "type": "string",
                "description": "Name of the location the tour starts from"
            },
            "return_to_start": {"type": "boolean", "default": true},
            "timeout": {
                "type": "number",
                "description": "Solver time limit in seconds"
            },
            "generate_report": {
                "type": "boolean",
                "description": "Generate an HTML report",
                "default": true
            }
        },
        "required": ["locations"]
    })
}
