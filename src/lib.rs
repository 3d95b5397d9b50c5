//! rprobe library exposing reusable connectivity probing utilities.

pub mod adapters;
pub mod domain;
mod error;
pub mod fmt;
pub mod services;
pub mod stats;

pub use domain::probe::{
    AddressFamily, OutcomeKind, ProbeConfig, ProbeMethod, ProbeOutcome, ProbeReport, ProbeTarget,
    Target,
};
pub use error::RprobeError;
pub use services::multi::probe_many;
pub use services::probe::{ParsedTarget, parse_target, run_probe, run_probe_with};
pub use stats::{LatencyStats, ProbeSummary, summarize};
