//! Reachability and credential probes for the external APIs the research
//! dashboard depends on.
//!
//! Each provider module builds its request(s) from an explicit
//! [`smoke_config::SmokeConfig`], sends them through [`smoke_http`], and
//! classifies the reply into a [`smoke_common::ProbeOutcome`]. The
//! [`ProbeSuite`] runs them in a fixed order and the [`report`] module renders
//! the per-probe lines and the closing summary.
pub mod probe;
pub mod providers;
pub mod report;
pub mod suite;

pub use probe::{Probe, ProbeMeta};
pub use report::Summary;
pub use suite::ProbeSuite;
