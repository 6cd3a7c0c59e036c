//! Cost Reporting
//!
//! This module contains the aggregate and projection types returned by the
//! ledger's query operations, and the text rendering the transport layer
//! logs when a request finishes. Serialization of these types for the
//! reporting surface is the caller's job; everything here derives `Serialize`.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pricing::Service;
use crate::record::RequestCostSummary;

/// Per-service slice of a daily report
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ServiceBreakdown {
    /// Cost in USD
    pub cost: f64,
    /// Input tokens
    pub input_tokens: u64,
    /// Output tokens
    pub output_tokens: u64,
    /// Billable calls
    pub calls: u64,
}

/// Aggregate cost of all requests completed for one UTC calendar date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCostReport {
    /// The UTC date covered
    pub date: NaiveDate,
    /// Cost in USD across all matching requests
    pub total_cost: f64,
    /// Input tokens across all matching requests
    pub total_input_tokens: u64,
    /// Output tokens across all matching requests
    pub total_output_tokens: u64,
    /// Completed requests whose tracking started on `date`
    pub total_requests: u64,
    /// Per-service totals, unioned across all calls of all matching requests
    pub service_breakdown: HashMap<Service, ServiceBreakdown>,
}

impl DailyCostReport {
    pub(crate) fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_cost: 0.0,
            total_input_tokens: 0,
            total_output_tokens: 0,
            total_requests: 0,
            service_breakdown: HashMap::new(),
        }
    }
}

/// Lightweight listing projection of a request summary
///
/// The shape the recent-requests reporting endpoint serializes; produced by
/// [`RequestCostSummary::overview`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestOverview {
    /// Correlation id
    pub request_id: Uuid,
    /// Inbound endpoint the request hit
    pub endpoint: String,
    /// When tracking started
    pub start_time: DateTime<Utc>,
    /// When the request finished; `None` while in flight
    pub end_time: Option<DateTime<Utc>>,
    /// Cost in USD
    pub total_cost: f64,
    /// Input tokens
    pub total_input_tokens: u64,
    /// Output tokens
    pub total_output_tokens: u64,
    /// Overall success
    pub success: bool,
    /// Tracked calls
    pub api_call_count: usize,
}

/// Render the per-request cost block logged when a request finishes
#[must_use]
pub fn format_request_summary(summary: &RequestCostSummary) -> String {
    let mut output = String::new();

    output.push_str("Request Cost Summary\n");
    output.push_str(&format!("Request ID: {}\n", summary.request_id));
    output.push_str(&format!("Endpoint: {}\n", summary.endpoint));
    output.push_str(&format!("Total Cost: ${:.6}\n", summary.total_cost));
    output.push_str(&format!("Input Tokens: {}\n", summary.total_input_tokens));
    output.push_str(&format!("Output Tokens: {}\n", summary.total_output_tokens));
    output.push_str(&format!("API Calls: {}\n", summary.calls.len()));

    for (i, call) in summary.calls.iter().enumerate() {
        output.push_str(&format!(
            "  Call {}: {}/{} - ${:.6}\n",
            i + 1,
            call.service,
            call.model,
            call.cost
        ));
    }

    output.push_str(&format!("Success: {}\n", summary.success));
    if !summary.success {
        if let Some(error) = &summary.error_message {
            output.push_str(&format!("Error: {error}\n"));
        }
    }

    output
}
