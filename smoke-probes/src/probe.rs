//! The probe seam plus the shared "invoke and classify" helpers every
//! provider goes through.
use async_trait::async_trait;
use smoke_common::{Evidence, ProbeFailure, ProbeOutcome};
use smoke_http::{HttpClient, HttpError, HttpReply};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::{Duration, Instant};

/// Display metadata for a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeMeta {
    /// Key in the summary table, e.g. "X (Twitter)".
    pub name: &'static str,
    /// Used in per-probe lines, e.g. "X (Twitter) API".
    pub label: &'static str,
    pub icon: &'static str,
    /// Appended to the banner, e.g. " (AI/ML/DL filtered)".
    pub focus: &'static str,
}

impl ProbeMeta {
    pub fn banner(&self) -> String {
        format!("{} Testing {}{}...", self.icon, self.label, self.focus)
    }
}

#[async_trait]
pub trait Probe: Send + Sync {
    fn meta(&self) -> ProbeMeta;

    /// Talk to the upstream and either surface evidence or say why not.
    async fn check(&self) -> Result<Evidence, ProbeFailure>;

    /// Run the check with logging; never panics and never errors.
    async fn run(&self) -> ProbeOutcome {
        let meta = self.meta();
        tracing::info!(probe = meta.name, "probe.start");
        let t0 = Instant::now();
        let outcome: ProbeOutcome = self.check().await.into();
        let elapsed_ms = t0.elapsed().as_millis() as u64;
        match &outcome {
            ProbeOutcome::Pass(ev) => {
                tracing::info!(probe = meta.name, elapsed_ms, summary = %ev.summary, "probe.finish.pass")
            }
            ProbeOutcome::Fail(f) => {
                tracing::warn!(probe = meta.name, elapsed_ms, kind = %f.kind, message = %f.message, "probe.finish.fail")
            }
        }
        outcome
    }
}

/// Borrow a credential or fail naming every acceptable variable.
pub(crate) fn require<'a>(
    value: &'a Option<String>,
    names: &[&str],
) -> Result<&'a str, ProbeFailure> {
    value
        .as_deref()
        .ok_or_else(|| ProbeFailure::missing_credential(names))
}

pub(crate) fn client(base: &str, timeout: Duration) -> Result<HttpClient, ProbeFailure> {
    HttpClient::new(base)
        .map(|c| c.with_timeout(timeout))
        .map_err(transport)
}

pub(crate) fn transport(e: HttpError) -> ProbeFailure {
    ProbeFailure::transport(e.to_string())
}

/// Await a call; transport faults and non-200 replies become failures.
pub(crate) async fn expect_ok<F>(call: F) -> Result<HttpReply, ProbeFailure>
where
    F: Future<Output = Result<HttpReply, HttpError>>,
{
    let reply = call.await.map_err(transport)?;
    if reply.is_ok() {
        Ok(reply)
    } else {
        Err(ProbeFailure::rejected(reply.status.as_u16(), reply.text()))
    }
}

/// A malformed 200 body is a transport-level fault.
pub(crate) fn decode<T: DeserializeOwned>(reply: &HttpReply) -> Result<T, ProbeFailure> {
    reply.json::<T>().map_err(transport)
}

/// [`expect_ok`] then [`decode`].
pub(crate) async fn invoke_json<T, F>(call: F) -> Result<T, ProbeFailure>
where
    T: DeserializeOwned,
    F: Future<Output = Result<HttpReply, HttpError>>,
{
    let reply = expect_ok(call).await?;
    decode(&reply)
}
