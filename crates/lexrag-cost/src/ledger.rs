//! Cost Ledger - Request correlation and lifecycle
//!
//! This module contains the [`CostLedger`], the shared accounting service
//! that owns every in-flight and completed request summary.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::pricing::{PricingCatalog, Service};
use crate::record::{ApiCall, RequestCostSummary};
use crate::report::DailyCostReport;

/// Completed requests retained in memory
const COMPLETED_CAPACITY: usize = 1000;

/// Concurrent per-request cost accounting service
///
/// Construct one instance at startup and hand clones to the transport layer
/// and to every integration point that bills a call; all clones share the
/// same ledger. The correlation id returned by [`CostLedger::start`] is
/// threaded explicitly as a value - the ledger keeps no ambient per-request
/// state.
///
/// Every operation takes one short critical section over the ledger state.
/// Nothing under the lock blocks or performs I/O, so the synchronous API is
/// safe to call from async request handlers.
#[derive(Debug, Clone)]
pub struct CostLedger {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    catalog: PricingCatalog,
    state: Mutex<LedgerState>,
    dropped_calls: AtomicU64,
}

#[derive(Debug, Default)]
struct LedgerState {
    active: HashMap<Uuid, RequestCostSummary>,
    completed: VecDeque<RequestCostSummary>,
}

impl CostLedger {
    /// Create a ledger with the built-in pricing catalog
    #[must_use]
    pub fn new() -> Self {
        Self::with_catalog(PricingCatalog::builtin())
    }

    /// Create a ledger with a custom pricing catalog
    #[must_use]
    pub fn with_catalog(catalog: PricingCatalog) -> Self {
        Self {
            inner: Arc::new(Inner {
                catalog,
                state: Mutex::new(LedgerState::default()),
                dropped_calls: AtomicU64::new(0),
            }),
        }
    }

    /// Begin tracking a new client request and return its correlation id
    ///
    /// Safe to call from any number of concurrent requests; ids are v4 uuids
    /// and never collide.
    pub fn start(&self, endpoint: &str, client_id: Option<String>) -> Uuid {
        let request_id = Uuid::new_v4();
        let summary = RequestCostSummary::new(request_id, endpoint, client_id);
        debug!(%request_id, endpoint, "request tracking started");
        self.inner.state.lock().active.insert(request_id, summary);
        request_id
    }

    /// Record one billable external call against an active request
    ///
    /// Computes the cost from the catalog, appends the call to the request's
    /// summary, and returns the cost. An unknown `request_id` (never started,
    /// or already finished) is absorbed: the cost is still returned but the
    /// ledger is left unchanged, so a bookkeeping mismatch can never fail the
    /// request path. The only error is a malformed `audio_minutes` value,
    /// rejected before it can corrupt totals.
    #[allow(clippy::too_many_arguments)]
    pub fn track_call(
        &self,
        request_id: Uuid,
        service: Service,
        model: &str,
        endpoint: &str,
        input_tokens: u32,
        output_tokens: u32,
        audio_minutes: f64,
        success: bool,
        error_message: Option<String>,
        duration_ms: u64,
    ) -> Result<f64> {
        if !audio_minutes.is_finite() || audio_minutes < 0.0 {
            return Err(Error::InvalidQuantity(format!(
                "audio_minutes must be finite and non-negative, got {audio_minutes}"
            )));
        }

        let rate = self.inner.catalog.rate(service, model);
        let cost = rate.cost(input_tokens, output_tokens, audio_minutes);

        let call = ApiCall {
            service,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            input_tokens,
            output_tokens,
            audio_minutes,
            cost,
            timestamp: Utc::now(),
            duration_ms,
            success,
            error_message,
        };

        let mut state = self.inner.state.lock();
        if let Some(summary) = state.active.get_mut(&request_id) {
            summary.record_call(call);
            debug!(%request_id, %service, model, cost, "tracked api call");
        } else {
            drop(state);
            self.inner.dropped_calls.fetch_add(1, Ordering::Relaxed);
            warn!(%request_id, %service, model, "dropping call for unknown request id");
        }

        Ok(cost)
    }

    /// Finish an active request and move it into the completed history
    ///
    /// Returns the finished summary, or `None` if `request_id` was not
    /// active - finishing twice, or finishing an id that was never started,
    /// is a no-op. A failed finish flips the summary's `success` to false;
    /// a successful finish never flips it back.
    pub fn finish(
        &self,
        request_id: Uuid,
        success: bool,
        error_message: Option<String>,
    ) -> Option<RequestCostSummary> {
        let mut state = self.inner.state.lock();
        let mut summary = state.active.remove(&request_id)?;
        summary.finish(success, error_message);
        state.completed.push_back(summary.clone());
        while state.completed.len() > COMPLETED_CAPACITY {
            state.completed.pop_front();
        }
        drop(state);

        info!(
            %request_id,
            endpoint = %summary.endpoint,
            total_cost = summary.total_cost,
            api_calls = summary.calls.len(),
            success = summary.success,
            "request tracking finished"
        );
        Some(summary)
    }

    /// Snapshot of one request, active or completed
    #[must_use]
    pub fn summary(&self, request_id: Uuid) -> Option<RequestCostSummary> {
        let state = self.inner.state.lock();
        if let Some(active) = state.active.get(&request_id) {
            return Some(active.clone());
        }
        state
            .completed
            .iter()
            .find(|s| s.request_id == request_id)
            .cloned()
    }

    /// Aggregate of completed requests whose tracking started on `date`
    ///
    /// `date` is a UTC calendar date and defaults to today. Only completed
    /// requests are counted: a long-running in-flight request shows up in the
    /// day's totals once it finishes, not before.
    #[must_use]
    pub fn daily_totals(&self, date: Option<NaiveDate>) -> DailyCostReport {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let mut report = DailyCostReport::empty(date);

        let state = self.inner.state.lock();
        for summary in state
            .completed
            .iter()
            .filter(|s| s.start_time.date_naive() == date)
        {
            report.total_cost += summary.total_cost;
            report.total_input_tokens += summary.total_input_tokens;
            report.total_output_tokens += summary.total_output_tokens;
            report.total_requests += 1;

            for call in &summary.calls {
                let breakdown = report.service_breakdown.entry(call.service).or_default();
                breakdown.cost += call.cost;
                breakdown.input_tokens += u64::from(call.input_tokens);
                breakdown.output_tokens += u64::from(call.output_tokens);
                breakdown.calls += 1;
            }
        }

        report
    }

    /// Most recently started completed requests, newest first
    ///
    /// The ledger imposes no cap beyond the completed-history size; callers
    /// clamp `limit` to whatever their surface allows.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<RequestCostSummary> {
        let state = self.inner.state.lock();
        let mut recent: Vec<_> = state.completed.iter().cloned().collect();
        drop(state);

        recent.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        recent.truncate(limit);
        recent
    }

    /// Number of tracked calls dropped because their request id was unknown
    ///
    /// Diagnostic counter for the silent-drop policy: a non-zero value means
    /// some call site tracked against a finished or never-issued id.
    #[must_use]
    pub fn dropped_calls(&self) -> u64 {
        self.inner.dropped_calls.load(Ordering::Relaxed)
    }
}

impl Default for CostLedger {
    fn default() -> Self {
        Self::new()
    }
}
