//! Optimization Client Façade
//!
//! One method per remote capability. Solve requests get their defaults
//! filled in and are otherwise sent verbatim; responses come back untouched.
//!
//! # Usage
//!
//! ```ignore
//! use optimization_mcp::client::{OptimizationApi, OptimizationClient};
//!
//! let client = OptimizationClient::from_config(&config.server)?;
//! let problem = LpProblem::new(
//!     vec![Variable::continuous("x"), Variable::continuous("y")],
//!     Objective::maximize("3*x + 2*y"),
//! )
//! .with_constraint(Constraint::new("x + y <= 10"));
//!
//! let response = client.solve_lp(problem).await?;
//! println!("{}: {:?}", response.status, response.objective_value);
//! ```

use crate::client::http_transport::HttpTransport;
use crate::client::retry::RetryConfig;
use crate::client::types::{
    AnalysisResponse, AnalyzeRequest, LinearProblem, LpProblem, MipProblem, ReportList,
    ReportSummary, SolveResponse, TspProblem, TspResponse,
};
use crate::config::ServerConfig;
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

/// Remote endpoints
pub mod paths {
    pub const SOLVE_LP: &str = "/api/solve/lp";
    pub const SOLVE_MIP: &str = "/api/solve/mip";
    pub const SOLVE_TSP: &str = "/api/solve/tsp";
    pub const ANALYZE: &str = "/api/analyze";
    pub const REPORTS: &str = "/api/reports";
}

/// Default page size for [`OptimizationApi::list_reports`]
pub const DEFAULT_REPORT_LIMIT: usize = 50;

/// Operations offered by the optimization service
///
/// [`OptimizationClient`] is the HTTP implementation; the MCP server and the
/// CLI only depend on this trait.
#[async_trait]
pub trait OptimizationApi: Send + Sync {
    /// Solve a linear program
    async fn solve_lp(&self, problem: LpProblem) -> Result<SolveResponse, TransportError>;

    /// Solve a mixed-integer program
    async fn solve_mip(&self, problem: MipProblem) -> Result<SolveResponse, TransportError>;

    /// Solve a traveling salesman problem
    async fn solve_tsp(&self, problem: TspProblem) -> Result<TspResponse, TransportError>;

    /// Classify a natural-language problem description
    async fn analyze_problem(&self, description: &str)
        -> Result<AnalysisResponse, TransportError>;

    /// Fetch a rendered report as raw HTML
    async fn get_report(&self, report_id: &str) -> Result<String, TransportError>;

    /// List stored reports, newest ordering as supplied by the service
    async fn list_reports(&self, limit: usize) -> Result<Vec<ReportSummary>, TransportError>;
}

/// HTTP client for the optimization service
#[derive(Debug, Clone)]
pub struct OptimizationClient {
    transport: HttpTransport,
}

impl OptimizationClient {
    /// Wrap an already configured transport
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// Build a client from the `[server]` configuration section
    pub fn from_config(config: &ServerConfig) -> Result<Self, TransportError> {
        let retry = RetryConfig::new()
            .max_retries(config.max_retries)
            .base_delay(Duration::from_millis(config.retry_base_delay_ms));

        let mut transport = HttpTransport::new(config.url.as_str())?
            .with_timeout(Duration::from_millis(config.timeout_ms))
            .with_retry(retry)
            .with_debug(config.debug);

        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            transport = transport.with_api_key(key);
        }

        Ok(Self::new(transport))
    }

    /// Get the underlying transport
    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    async fn solve_linear(
        &self,
        path: &str,
        problem: LinearProblem,
    ) -> Result<SolveResponse, TransportError> {
        let problem = with_linear_defaults(problem);
        tracing::debug!(
            "Solving {} with {} variables and {} constraints",
            path,
            problem.variables.len(),
            problem.constraints.len()
        );
        self.transport.post(path, &problem).await
    }
}

/// Fill the defaults the service expects on solve requests
fn with_linear_defaults(mut problem: LinearProblem) -> LinearProblem {
    problem.generate_report.get_or_insert(true);
    problem
}

/// Path of a single report, with the identifier percent-encoded as one segment
fn report_path(report_id: &str) -> Result<String, TransportError> {
    let invalid = || TransportError::InvalidUrl {
        url: report_id.to_string(),
        reason: "cannot be used as a report identifier".to_string(),
    };

    let mut url = Url::parse(&format!("http://localhost{}", paths::REPORTS)).map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|_| invalid())?
        .push(report_id);
    Ok(url.path().to_string())
}

#[async_trait]
impl OptimizationApi for OptimizationClient {
    async fn solve_lp(&self, problem: LpProblem) -> Result<SolveResponse, TransportError> {
        self.solve_linear(paths::SOLVE_LP, problem).await
    }

    async fn solve_mip(&self, problem: MipProblem) -> Result<SolveResponse, TransportError> {
        self.solve_linear(paths::SOLVE_MIP, problem).await
    }

    async fn solve_tsp(&self, mut problem: TspProblem) -> Result<TspResponse, TransportError> {
        problem.generate_report.get_or_insert(true);
        tracing::debug!("Solving TSP with {} locations", problem.locations.len());
        self.transport.post(paths::SOLVE_TSP, &problem).await
    }

    async fn analyze_problem(
        &self,
        description: &str,
    ) -> Result<AnalysisResponse, TransportError> {
        let body = AnalyzeRequest {
            description: description.to_string(),
        };
        self.transport.post(paths::ANALYZE, &body).await
    }

    async fn get_report(&self, report_id: &str) -> Result<String, TransportError> {
        let path = report_path(report_id)?;
        self.transport.get_text(&path).await
    }

    async fn list_reports(&self, limit: usize) -> Result<Vec<ReportSummary>, TransportError> {
        let path = format!("{}?limit={}", paths::REPORTS, limit);
        let list: ReportList = self.transport.get(&path).await?;

        let mut reports = list.reports;
        reports.truncate(limit);
        tracing::debug!("Listed {} of {} reports", reports.len(), list.total);
        Ok(reports)
    }
}
