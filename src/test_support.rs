//! Shared test doubles

use crate::client::api::OptimizationApi;
use crate::client::types::{
    AnalysisResponse, LpProblem, MipProblem, ReportSummary, SolveResponse, TspProblem,
    TspResponse,
};
use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type ErrorFactory = Arc<dyn Fn() -> TransportError + Send + Sync>;

/// In-memory [`OptimizationApi`] returning canned responses
#[derive(Clone, Default)]
pub(crate) struct MockApi {
    calls: Arc<Mutex<Vec<String>>>,
    failure: Option<ErrorFactory>,
    delay: Option<Duration>,
}

impl MockApi {
    /// Every call fails with an error built by `make`
    pub(crate) fn failing(make: impl Fn() -> TransportError + Send + Sync + 'static) -> Self {
        Self {
            calls: Arc::default(),
            failure: Some(Arc::new(make)),
            delay: None,
        }
    }

    /// Every call sleeps for `delay` before answering
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Names of the operations invoked so far
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    async fn record(&self, operation: &str) -> Result<(), TransportError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(operation.to_string());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }
}

fn optimal_solution() -> SolveResponse {
    serde_json::from_value(json!({
        "status": "OPTIMAL",
        "objective_value": 20.0,
        "solution": {"x": 0.0, "y": 10.0},
        "report_id": "r-1"
    }))
    .unwrap()
}

#[async_trait]
impl OptimizationApi for MockApi {
    async fn solve_lp(&self, _problem: LpProblem) -> Result<SolveResponse, TransportError> {
        self.record("solve_lp").await?;
        Ok(optimal_solution())
    }

    async fn solve_mip(&self, _problem: MipProblem) -> Result<SolveResponse, TransportError> {
        self.record("solve_mip").await?;
        Ok(optimal_solution())
    }

    async fn solve_tsp(&self, problem: TspProblem) -> Result<TspResponse, TransportError> {
        self.record("solve_tsp").await?;
        let mut route: Vec<String> = problem.locations.iter().map(|l| l.name.clone()).collect();
        if let Some(first) = route.first().cloned() {
            route.push(first);
        }
        Ok(serde_json::from_value(json!({
            "status": "OPTIMAL",
            "objective_value": 15000.0,
            "route": route
        }))
        .unwrap())
    }

    async fn analyze_problem(
        &self,
        _description: &str,
    ) -> Result<AnalysisResponse, TransportError> {
        self.record("analyze_problem").await?;
        Ok(serde_json::from_value(json!({
            "problem_type": "LP",
            "confidence": 0.9,
            "variables": ["x", "y"]
        }))
        .unwrap())
    }

    async fn get_report(&self, report_id: &str) -> Result<String, TransportError> {
        self.record("get_report").await?;
        Ok(format!("<html>{}</html>", report_id))
    }

    async fn list_reports(&self, limit: usize) -> Result<Vec<ReportSummary>, TransportError> {
        self.record("list_reports").await?;
        let reports: Vec<ReportSummary> = serde_json::from_value(json!([
            {"id": "r-1", "problem_type": "LP"},
            {"id": "r-2", "problem_type": "TSP"},
            {"id": "r-3"}
        ]))
        .unwrap();
        Ok(reports.into_iter().take(limit).collect())
    }
}
