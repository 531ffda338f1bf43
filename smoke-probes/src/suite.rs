//! Fixed-order registry of probes and the sequential runner.
use crate::probe::Probe;
use crate::providers::{
    HackerNewsProbe, HuggingFaceProbe, NewsApiProbe, RedditProbe, StackExchangeProbe, TwitterProbe,
    YouTubeProbe,
};
use crate::report::{Summary, write_banner, write_header, write_outcome};
use smoke_config::SmokeConfig;
use std::io::{self, Write};

pub struct ProbeSuite {
    probes: Vec<Box<dyn Probe>>,
}

impl ProbeSuite {
    pub fn new(probes: Vec<Box<dyn Probe>>) -> Self {
        Self { probes }
    }

    /// All seven providers in registration order.
    pub fn from_config(cfg: &SmokeConfig) -> Self {
        Self::new(vec![
            Box::new(HuggingFaceProbe::from_config(cfg)),
            Box::new(TwitterProbe::from_config(cfg)),
            Box::new(YouTubeProbe::from_config(cfg)),
            Box::new(NewsApiProbe::from_config(cfg)),
            Box::new(RedditProbe::from_config(cfg)),
            Box::new(HackerNewsProbe::from_config(cfg)),
            Box::new(StackExchangeProbe::from_config(cfg)),
        ])
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.probes.iter().map(|p| p.meta().name).collect()
    }

    /// Run every probe one after another, streaming diagnostics to `out`.
    /// Only write failures on `out` are errors; probe failures are data.
    pub async fn run<W: Write>(&self, out: &mut W) -> io::Result<Summary> {
        write_header(out)?;
        let mut summary = Summary::default();
        for probe in &self.probes {
            let meta = probe.meta();
            write_banner(out, &meta)?;
            out.flush()?;
            let outcome = probe.run().await;
            write_outcome(out, &meta, &outcome)?;
            summary.push(meta.name, outcome);
        }
        tracing::info!(
            passed = summary.passed(),
            total = summary.total(),
            "suite.finished"
        );
        Ok(summary)
    }
}
