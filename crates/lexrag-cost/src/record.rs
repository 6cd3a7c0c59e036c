//! Per-call Records and Per-request Summaries
//!
//! This module contains the value types the ledger stores. Both are plain
//! data: an [`ApiCall`] is immutable once constructed, and a
//! [`RequestCostSummary`] is only ever mutated by the ledger while it holds
//! its lock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pricing::Service;
use crate::report::RequestOverview;

/// A single billable external call and its computed cost
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCall {
    /// Vendor/API family that billed the call
    pub service: Service,
    /// Specific operation, e.g. "chat/completions"
    pub endpoint: String,
    /// Billed model/pricing tier
    pub model: String,
    /// Input tokens (0 for audio calls)
    pub input_tokens: u32,
    /// Output tokens (0 for audio calls)
    pub output_tokens: u32,
    /// Minutes of audio, for duration-billed calls
    pub audio_minutes: f64,
    /// Cost in USD, fixed at track time
    pub cost: f64,
    /// When the call was recorded
    pub timestamp: DateTime<Utc>,
    /// Wall-clock duration of the call in milliseconds
    pub duration_ms: u64,
    /// Did the billed operation succeed?
    pub success: bool,
    /// Failure reason, when `success` is false
    pub error_message: Option<String>,
}

/// Aggregate of all billable calls made on behalf of one client request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestCostSummary {
    /// Correlation id issued by [`crate::CostLedger::start`]
    pub request_id: Uuid,
    /// Inbound endpoint the request hit
    pub endpoint: String,
    /// Caller identity when known, e.g. the client IP
    pub client_id: Option<String>,
    /// When tracking started
    pub start_time: DateTime<Utc>,
    /// When the request finished; `None` while in flight
    pub end_time: Option<DateTime<Utc>>,
    /// Every tracked call, in call order
    pub calls: Vec<ApiCall>,
    /// Running sum of `calls[..].cost`
    pub total_cost: f64,
    /// Running sum of `calls[..].input_tokens`
    pub total_input_tokens: u64,
    /// Running sum of `calls[..].output_tokens`
    pub total_output_tokens: u64,
    /// False once any call fails or the request finishes with failure
    pub success: bool,
    /// Last failure reason observed, from a call or from finish
    pub error_message: Option<String>,
}

impl RequestCostSummary {
    pub(crate) fn new(request_id: Uuid, endpoint: &str, client_id: Option<String>) -> Self {
        Self {
            request_id,
            endpoint: endpoint.to_string(),
            client_id,
            start_time: Utc::now(),
            end_time: None,
            calls: Vec::new(),
            total_cost: 0.0,
            total_input_tokens: 0,
            total_output_tokens: 0,
            success: true,
            error_message: None,
        }
    }

    /// Append a call and update the running totals
    ///
    /// `success` is monotonic: a failed call flips it to false and nothing
    /// ever flips it back.
    pub(crate) fn record_call(&mut self, call: ApiCall) {
        self.total_cost += call.cost;
        self.total_input_tokens += u64::from(call.input_tokens);
        self.total_output_tokens += u64::from(call.output_tokens);
        if !call.success {
            self.success = false;
            if call.error_message.is_some() {
                self.error_message = call.error_message.clone();
            }
        }
        self.calls.push(call);
    }

    /// Stamp the end time and fold in the request-level outcome
    pub(crate) fn finish(&mut self, success: bool, error_message: Option<String>) {
        self.end_time = Some(Utc::now());
        if !success {
            self.success = false;
            if error_message.is_some() {
                self.error_message = error_message;
            }
        }
    }

    /// Lightweight projection for listing endpoints
    #[must_use]
    pub fn overview(&self) -> RequestOverview {
        RequestOverview {
            request_id: self.request_id,
            endpoint: self.endpoint.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            total_cost: self.total_cost,
            total_input_tokens: self.total_input_tokens,
            total_output_tokens: self.total_output_tokens,
            success: self.success,
            api_call_count: self.calls.len(),
        }
    }
}
