//! Text rendering of service responses for tool results
//!
//! Output is deterministic: optional fields are omitted, never printed as
//! placeholders, and solution entries appear in variable-name order.

use crate::client::types::{AnalysisResponse, ReportSummary, SolveResponse, TspResponse};
use serde_json::Value;
use std::fmt::Write;

const ARROW: &str = " → ";

/// Render an LP or MIP result
pub fn format_solve_result(response: &SolveResponse) -> String {
    let mut out = String::new();
    line(&mut out, format_args!("Status: {}", response.status));

    if let Some(value) = response.objective_value {
        line(&mut out, format_args!("Objective Value: {}", value));
    }

    if let Some(solution) = response.solution.as_ref().filter(|s| !s.is_empty()) {
        line(&mut out, format_args!("Solution:"));
        for (name, value) in solution {
            line(&mut out, format_args!("  {} = {}", name, solution_value(value)));
        }
    }

    push_metadata(
        &mut out,
        response.execution_time,
        response.solver.as_deref(),
        response.message.as_deref(),
    );
    push_report_hint(&mut out, response.report_id.as_deref());
    finish(out)
}

/// Render a TSP result; distances arrive in meters and are shown in kilometers
pub fn format_tsp_result(response: &TspResponse) -> String {
    let mut out = String::new();
    line(&mut out, format_args!("Status: {}", response.status));

    if let Some(meters) = response.objective_value {
        line(&mut out, format_args!("Total Distance: {} km", kilometers(meters)));
    }

    if let Some(route) = response.route.as_ref().filter(|r| !r.is_empty()) {
        line(&mut out, format_args!("Route: {}", route.join(ARROW)));
    }

    if let Some(segments) = response.segments.as_ref().filter(|s| !s.is_empty()) {
        line(&mut out, format_args!("Segments:"));
        for segment in segments {
            line(
                &mut out,
                format_args!(
                    "  {}{}{}: {} km",
                    segment.from,
                    ARROW,
                    segment.to,
                    kilometers(segment.distance)
                ),
            );
        }
    }

    push_metadata(
        &mut out,
        response.execution_time,
        response.solver.as_deref(),
        response.message.as_deref(),
    );
    push_report_hint(&mut out, response.report_id.as_deref());
    finish(out)
}

/// Render a problem analysis
pub fn format_analysis(response: &AnalysisResponse) -> String {
    let mut out = String::new();
    line(&mut out, format_args!("Problem Type: {}", response.problem_type));
    line(
        &mut out,
        format_args!("Confidence: {:.1}%", response.confidence * 100.0),
    );

    push_list(&mut out, "Variables", &response.variables);
    push_list(&mut out, "Constraints", &response.constraints);
    push_list(&mut out, "Recommendations", &response.recommendations);
    finish(out)
}

/// Render a report listing, one report per line
pub fn format_report_list(reports: &[ReportSummary]) -> String {
    if reports.is_empty() {
        return "No reports found.".to_string();
    }

    let mut out = String::new();
    for report in reports {
        let mut entry = report.id.clone();
        for field in [&report.problem_type, &report.status, &report.created_at]
            .into_iter()
            .flatten()
        {
            entry.push_str("  ");
            entry.push_str(field);
        }
        line(&mut out, format_args!("{}", entry));
    }
    finish(out)
}

/// Meters to kilometers with two decimals
pub fn kilometers(meters: f64) -> String {
    format!("{:.2}", meters / 1000.0)
}

fn push_metadata(
    out: &mut String,
    execution_time: Option<f64>,
    solver: Option<&str>,
    message: Option<&str>,
) {
    if let Some(seconds) = execution_time {
        line(out, format_args!("Execution Time: {:.3}s", seconds));
    }
    if let Some(solver) = solver {
        line(out, format_args!("Solver: {}", solver));
    }
    if let Some(message) = message {
        line(out, format_args!("Message: {}", message));
    }
}

fn push_report_hint(out: &mut String, report_id: Option<&str>) {
    let Some(id) = report_id else {
        return;
    };
    out.push('\n');
    line(out, format_args!("Report ID: {}", id));
    line(
        out,
        format_args!(
            "Use the get_report tool with report_id \"{}\" to view the full HTML report.",
            id
        ),
    );
}

/// Numbers print like `f64`, so `10` and `10.0` both read `10`
fn solution_value(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) => f.to_string(),
            None => n.to_string(),
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn push_list(out: &mut String, title: &str, items: &[String]) {
    line(out, format_args!("{}:", title));
    if items.is_empty() {
        line(out, format_args!("  (none)"));
    }
    for item in items {
        line(out, format_args!("  - {}", item));
    }
}

fn line(out: &mut String, args: std::fmt::Arguments<'_>) {
    // Writing into a String cannot fail
    let _ = out.write_fmt(args);
    out.push('\n');
}

fn finish(mut out: String) -> String {
    let trimmed = out.trim_end_matches('\n').len();
    out.truncate(trimmed);
    out
}
