//! CLI Command Module
//!
//! Operations behind the one-shot CLI subcommands. Each returns the text to
//! print so the binary stays a thin dispatcher and the logic can be tested
//! against a mock [`OptimizationApi`].

use crate::client::api::OptimizationApi;
use crate::client::types::{LinearProblem, TspProblem};
use crate::mcp::format;
use crate::mcp::tools::tool_definitions;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Problem class of a problem file
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProblemKind {
    /// Linear program
    Lp,
    /// Mixed-integer program
    Mip,
    /// Traveling salesman problem
    Tsp,
}

/// Read and decode a JSON problem file
fn read_problem<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read problem file {:?}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse problem file {:?}", path))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize response")
}

/// Solve the problem stored in `path`
///
/// Returns the formatted result, or the raw response as pretty JSON when
/// `as_json` is set.
pub async fn solve_from_file(
    api: &dyn OptimizationApi,
    kind: ProblemKind,
    path: &Path,
    as_json: bool,
) -> Result<String> {
    info!("Solving {:?} problem from {:?}", kind, path);

    match kind {
        ProblemKind::Lp | ProblemKind::Mip => {
            let problem: LinearProblem = read_problem(path)?;
            let response = if kind == ProblemKind::Lp {
                api.solve_lp(problem).await
            } else {
                api.solve_mip(problem).await
            }
            .context("Solve request failed")?;

            if as_json {
                to_json(&response)
            } else {
                Ok(format::format_solve_result(&response))
            }
        }
        ProblemKind::Tsp => {
            let problem: TspProblem = read_problem(path)?;
            let response = api
                .solve_tsp(problem)
                .await
                .context("Solve request failed")?;

            if as_json {
                to_json(&response)
            } else {
                Ok(format::format_tsp_result(&response))
            }
        }
    }
}

/// Analyze a natural-language problem description
pub async fn analyze(api: &dyn OptimizationApi, description: &str, as_json: bool) -> Result<String> {
    let response = api
        .analyze_problem(description)
        .await
        .context("Analysis request failed")?;

    if as_json {
        to_json(&response)
    } else {
        Ok(format::format_analysis(&response))
    }
}

/// Fetch a report, optionally saving the HTML to `output`
///
/// Returns the HTML itself, or a confirmation line when it was written to a file.
pub async fn fetch_report(
    api: &dyn OptimizationApi,
    report_id: &str,
    output: Option<&Path>,
) -> Result<String> {
    let html = api
        .get_report(report_id)
        .await
        .with_context(|| format!("Failed to fetch report {}", report_id))?;

    match output {
        Some(path) => {
            fs::write(path, &html)
                .with_context(|| format!("Failed to write report to {:?}", path))?;
            info!("Saved report {} ({} bytes)", report_id, html.len());
            Ok(format!("Report {} saved to {}", report_id, path.display()))
        }
        None => Ok(html),
    }
}

/// List stored reports, one per line
pub async fn list_reports(api: &dyn OptimizationApi, limit: usize) -> Result<String> {
    let reports = api
        .list_reports(limit)
        .await
        .context("Failed to list reports")?;
    Ok(format::format_report_list(&reports))
}

/// Tool declarations as pretty JSON
pub fn tools_json() -> Result<String> {
    to_json(&tool_definitions())
}
