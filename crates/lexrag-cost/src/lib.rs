//! LexRAG Cost - Per-request API cost accounting
//!
//! This crate provides the cost ledger for the LexRAG backend: every billable
//! external call (completion, transcription, embedding) is correlated to the
//! client request that triggered it, priced from a static catalog, and rolled
//! up into per-request and daily totals.
//!
//! The transport layer calls [`CostLedger::start`] once per inbound request
//! and threads the returned id explicitly into every integration point that
//! may bill a call; each such call site reports itself once via
//! [`CostLedger::track_call`], and the transport layer calls
//! [`CostLedger::finish`] on every exit path. The ledger never performs I/O,
//! never suspends, and none of its operations can fail the request path.
//!
//! # Module Structure
//!
//! - `pricing`: Service families, billing rates, and the pricing catalog
//! - `record`: Per-call records and per-request summaries
//! - `ledger`: CostLedger implementation
//! - `report`: Daily aggregates, listing projections, and report rendering
//! - `error`: Crate error type

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod ledger;
mod pricing;
mod record;
mod report;


// Re-export public types
pub use error::{Error, Result};
pub use ledger::CostLedger;
pub use pricing::{PricingCatalog, Rate, Service};
pub use record::{ApiCall, RequestCostSummary};
pub use report::{format_request_summary, DailyCostReport, RequestOverview, ServiceBreakdown};
