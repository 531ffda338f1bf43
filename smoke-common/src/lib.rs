//! Common types and utilities shared across the api-smoke crates.
//!
//! This crate defines the probe outcome model, the failure taxonomy, and the
//! observability helpers used by the binary and the integration tests. It is
//! intentionally dependency‑minimal so the HTTP and probe crates can share it
//! without pulling in each other.
//!
//! # Overview
//!
//! - [`ProbeOutcome`]: success-with-evidence or failure-with-reason
//! - [`Evidence`]: the small piece of response data that proves a call worked
//! - [`ProbeFailure`] and [`FailureKind`]: why a probe failed
//! - [`observability`]: Centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use smoke_common::{Evidence, FailureKind, ProbeFailure, ProbeOutcome};
//!
//! let ok = ProbeOutcome::Pass(Evidence::new("Found 3 posts"));
//! assert!(ok.passed());
//!
//! let missing = ProbeOutcome::Fail(ProbeFailure::missing_credential(&["YOUTUBE_API_KEY"]));
//! assert!(!missing.passed());
//! assert_eq!(missing.failure().map(|f| f.kind), Some(FailureKind::MissingCredential));
//! ```
use std::fmt;

pub mod observability;

/// Data surfaced in a probe's success message.
///
/// `summary` is the headline ("Found 10 tweets"), `notes` are indented
/// free-form lines, and `items` are rendered as a numbered, truncated list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evidence {
    pub summary: String,
    pub notes: Vec<String>,
    pub items: Vec<String>,
}

impl Evidence {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..Default::default()
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items.extend(items.into_iter().map(Into::into));
        self
    }
}

/// Coarse failure taxonomy carried through to the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A required credential was absent; no request was sent.
    MissingCredential,
    /// Connect/DNS/timeout, or a body that could not be decoded.
    Transport,
    /// Upstream answered with a non-200 status.
    Rejected,
    /// Calls succeeded but the expected content was not there.
    EmptyResult,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::MissingCredential => "missing credential",
            FailureKind::Transport => "transport",
            FailureKind::Rejected => "rejected",
            FailureKind::EmptyResult => "empty result",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reason for a single probe.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProbeFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ProbeFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Names every missing variable, joined with " or " for alternatives.
    pub fn missing_credential(vars: &[&str]) -> Self {
        Self::new(
            FailureKind::MissingCredential,
            format!("{} not found in configuration", vars.join(" or ")),
        )
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Transport, message)
    }

    pub fn rejected(status: u16, body: impl AsRef<str>) -> Self {
        Self::new(
            FailureKind::Rejected,
            format!("{status} - {}", body.as_ref()),
        )
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self::new(FailureKind::EmptyResult, message)
    }
}

/// Result of running one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Pass(Evidence),
    Fail(ProbeFailure),
}

impl ProbeOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, ProbeOutcome::Pass(_))
    }

    pub fn evidence(&self) -> Option<&Evidence> {
        match self {
            ProbeOutcome::Pass(e) => Some(e),
            ProbeOutcome::Fail(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ProbeFailure> {
        match self {
            ProbeOutcome::Pass(_) => None,
            ProbeOutcome::Fail(f) => Some(f),
        }
    }
}

impl From<Result<Evidence, ProbeFailure>> for ProbeOutcome {
    fn from(res: Result<Evidence, ProbeFailure>) -> Self {
        match res {
            Ok(e) => ProbeOutcome::Pass(e),
            Err(f) => ProbeOutcome::Fail(f),
        }
    }
}

/// Truncate to at most `max` characters without splitting a code point.
///
/// ```
/// assert_eq!(smoke_common::truncate_chars("héllo", 2), "hé");
/// assert_eq!(smoke_common::truncate_chars("hi", 10), "hi");
/// ```
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_names_all_alternatives() {
        let f = ProbeFailure::missing_credential(&["X_BEARER_TOKEN", "TWITTER_BEARER_TOKEN"]);
        assert_eq!(f.kind, FailureKind::MissingCredential);
        assert_eq!(
            f.to_string(),
            "X_BEARER_TOKEN or TWITTER_BEARER_TOKEN not found in configuration"
        );
    }

    #[test]
    fn rejected_message_leads_with_status() {
        let f = ProbeFailure::rejected(401, r#"{"error":"unauthorized"}"#);
        assert!(f.message.starts_with("401 - "));
        assert_eq!(f.kind, FailureKind::Rejected);
    }

    #[test]
    fn outcome_from_result() {
        let ok: ProbeOutcome = Ok::<_, ProbeFailure>(Evidence::new("fine")).into();
        assert!(ok.passed());
        assert_eq!(ok.evidence().map(|e| e.summary.as_str()), Some("fine"));

        let bad: ProbeOutcome = Err::<Evidence, _>(ProbeFailure::empty("nothing")).into();
        assert!(!bad.passed());
        assert!(bad.evidence().is_none());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "🤗🤗🤗";
        assert_eq!(truncate_chars(s, 1), "🤗");
        assert_eq!(truncate_chars(s, 0), "");
        assert_eq!(truncate_chars(s, 3), s);
    }
}
