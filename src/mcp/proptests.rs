//! Property-Based Tests for the MCP Adapter
//!
//! # Test Strategies
//!
//! - **Formatting**: distance conversion and report-hint presence for arbitrary responses
//! - **Dispatch**: unknown tool names always yield an error block, never a failure
//! - **Retry Logic**: backoff delays are monotone and capped
//! - **Message Handling**: arbitrary input lines, UTF-8 or not, never produce an unparsable reply
//!
//! # Running the Tests
//!
//! ```bash
//! cargo test --lib mcp::proptests
//! ```

use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::client::retry::RetryConfig;
use crate::client::types::{SolveResponse, TspResponse};
use crate::mcp::format::{format_solve_result, format_tsp_result, kilometers};
use crate::mcp::server::McpServer;
use crate::mcp::tools::TOOL_NAMES;
use crate::test_support::MockApi;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn arb_solve_response() -> impl Strategy<Value = SolveResponse> {
    (
        "[A-Z_]{1,12}",
        proptest::option::of(-1e6f64..1e6),
        proptest::option::of(btree_map(
            "[a-z][a-z0-9_]{0,6}",
            (-1e3f64..1e3).prop_map(|v| json!(v)),
            0..5,
        )),
        proptest::option::of("[a-z0-9-]{1,12}"),
        proptest::option::of(0.0f64..100.0),
    )
        .prop_map(
            |(status, objective_value, solution, report_id, execution_time)| SolveResponse {
                status,
                objective_value,
                solution,
                report_id,
                execution_time,
                solver: None,
                message: None,
                extra: Default::default(),
            },
        )
}

proptest! {
    #[test]
    fn prop_kilometers_has_two_decimals(meters in 0.0f64..1e9) {
        let km = kilometers(meters);
        let (_, decimals) = km.split_once('.').unwrap();
        prop_assert_eq!(decimals.len(), 2);

        let parsed: f64 = km.parse().unwrap();
        prop_assert!((parsed - meters / 1000.0).abs() <= 0.005 + 1e-9);
    }

    #[test]
    fn prop_whole_kilometers_render_exactly(km in 0u32..100_000) {
        let response: TspResponse = serde_json::from_value(json!({
            "status": "OPTIMAL",
            "objective_value": f64::from(km) * 1000.0
        })).unwrap();

        let text = format_tsp_result(&response);
        let expected = format!("Total Distance: {}.00 km", km);
        prop_assert!(text.contains(&expected));
    }

    #[test]
    fn prop_report_hint_iff_report_id(response in arb_solve_response()) {
        let text = format_solve_result(&response);
        prop_assert!(text.starts_with("Status: "));

        match &response.report_id {
            Some(id) => {
                let expected = format!("Report ID: {}", id);
                prop_assert!(text.contains(&expected));
                prop_assert!(text.contains("get_report"));
            }
            None => {
                prop_assert!(!text.contains("Report ID"));
                prop_assert!(!text.contains("get_report"));
            }
        }
    }

    #[test]
    fn prop_solution_lines_in_name_order(response in arb_solve_response()) {
        let text = format_solve_result(&response);
        let names: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with("  "))
            .filter_map(|l| l.trim().split(" = ").next())
            .collect();

        let mut sorted = names.clone();
        sorted.sort_unstable();
        prop_assert_eq!(names, sorted);
    }

    #[test]
    fn prop_unknown_tool_yields_error_block(name in "[a-z_]{1,20}") {
        prop_assume!(!TOOL_NAMES.contains(&name.as_str()));

        let api = MockApi::default();
        let server = McpServer::new(Arc::new(api.clone()));
        let result = runtime().block_on(server.call_tool(&name, json!({})));

        prop_assert!(result.is_error);
        prop_assert_eq!(result.content.len(), 1);
        prop_assert!(api.calls().is_empty());
    }

    #[test]
    fn prop_arbitrary_lines_get_valid_replies(line in ".{0,64}") {
        let server = McpServer::new(Arc::new(MockApi::default()));

        if let Some(reply) = runtime().block_on(server.handle_line(&line)) {
            let value: Value = serde_json::from_str(&reply).unwrap();
            prop_assert_eq!(&value["jsonrpc"], "2.0");
            prop_assert!(value.get("result").is_some() != value.get("error").is_some());
        }
    }

    #[test]
    fn prop_arbitrary_bytes_get_valid_replies(bytes in vec(any::<u8>(), 0..64)) {
        let server = McpServer::new(Arc::new(MockApi::default()));

        if let Some(reply) = runtime().block_on(server.handle_message(&bytes)) {
            let value: Value = serde_json::from_str(&reply).unwrap();
            prop_assert_eq!(&value["jsonrpc"], "2.0");
            prop_assert!(value.get("result").is_some() != value.get("error").is_some());
        }
    }

    #[test]
    fn prop_backoff_monotone_and_capped(
        base_ms in 1u64..5_000,
        max_ms in 1u64..60_000,
        attempts in vec(0u32..64, 1..8)
    ) {
        let config = RetryConfig::new()
            .base_delay(Duration::from_millis(base_ms))
            .max_delay(Duration::from_millis(max_ms));

        let mut sorted = attempts.clone();
        sorted.sort_unstable();

        let mut previous = Duration::ZERO;
        for attempt in sorted {
            let delay = config.calculate_delay(attempt);
            prop_assert!(delay <= config.max_delay);
            prop_assert!(delay >= previous);
            previous = delay;
        }
    }
}
