use crate::probe::{Probe, ProbeMeta, client, invoke_json, require};
use async_trait::async_trait;
use serde::Deserialize;
use smoke_common::{Evidence, ProbeFailure};
use smoke_config::{SmokeConfig, TWITTER_BEARER_TOKEN, X_BEARER_TOKEN};
use smoke_http::{Auth, RequestOpts};
use std::time::Duration;

/// `/2/tweets/search/recent` envelope; only the tweet list matters here.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Option<Vec<serde_json::Value>>,
}

/// App-only recent search against the X v2 API.
pub struct TwitterProbe {
    bearer: Option<String>,
    base: String,
    timeout: Duration,
}

impl TwitterProbe {
    pub fn from_config(cfg: &SmokeConfig) -> Self {
        Self {
            bearer: cfg.credentials.x_bearer_token.clone(),
            base: cfg.endpoints.twitter.clone(),
            timeout: cfg.timeout(),
        }
    }
}

#[async_trait]
impl Probe for TwitterProbe {
    fn meta(&self) -> ProbeMeta {
        ProbeMeta {
            name: "X (Twitter)",
            label: "X (Twitter) API",
            icon: "🐦",
            focus: "",
        }
    }

    async fn check(&self) -> Result<Evidence, ProbeFailure> {
        let bearer = require(&self.bearer, &[X_BEARER_TOKEN, TWITTER_BEARER_TOKEN])?;
        let http = client(&self.base, self.timeout)?;

        let resp: SearchResponse = invoke_json(http.get(
            "2/tweets/search/recent",
            RequestOpts {
                auth: Some(Auth::Bearer(bearer)),
                query: Some(vec![("query", "test".into()), ("max_results", "10".into())]),
                ..Default::default()
            },
        ))
        .await?;

        let count = resp.data.map(|d| d.len()).unwrap_or(0);
        Ok(Evidence::new(format!("Found {count} tweets")))
    }
}
