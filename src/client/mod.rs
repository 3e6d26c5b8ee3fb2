//! Optimization Service Client
//!
//! # Architecture
//!
//! 1. **Types** (`types`): request/response shapes
//! 2. **Retry** (`retry`): backoff policy and retry predicate
//! 3. **Transport** (`http_transport`): reqwest execution with auth, timeout and retries
//! 4. **Façade** (`api`): one typed method per remote capability

pub mod api;
pub mod http_transport;
pub mod retry;
pub mod types;

pub use api::{OptimizationApi, OptimizationClient, DEFAULT_REPORT_LIMIT};
pub use http_transport::{HttpTransport, API_KEY_HEADER};
pub use retry::RetryConfig;
pub use types::{
    AnalysisResponse, Constraint, ConstraintKind, LinearProblem, Location, LpProblem, MipProblem,
    Objective, ObjectiveSense, ReportList, ReportSummary, RouteSegment, SolveResponse,
    TspProblem, TspResponse, Variable, VariableKind,
};
