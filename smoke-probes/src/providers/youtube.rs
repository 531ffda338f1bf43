use crate::probe::{Probe, ProbeMeta, client, invoke_json, require};
use async_trait::async_trait;
use serde::Deserialize;
use smoke_common::{Evidence, ProbeFailure};
use smoke_config::{SmokeConfig, YOUTUBE_API_KEY};
use smoke_http::{Auth, RequestOpts};
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchListResponse {
    #[serde(default)]
    page_info: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    total_results: Option<u64>,
}

/// Single-result search against the YouTube Data API v3.
pub struct YouTubeProbe {
    api_key: Option<String>,
    base: String,
    timeout: Duration,
}

impl YouTubeProbe {
    pub fn from_config(cfg: &SmokeConfig) -> Self {
        Self {
            api_key: cfg.credentials.youtube_api_key.clone(),
            base: cfg.endpoints.youtube.clone(),
            timeout: cfg.timeout(),
        }
    }
}

#[async_trait]
impl Probe for YouTubeProbe {
    fn meta(&self) -> ProbeMeta {
        ProbeMeta {
            name: "YouTube",
            label: "YouTube API",
            icon: "▶️ ",
            focus: "",
        }
    }

    async fn check(&self) -> Result<Evidence, ProbeFailure> {
        let key = require(&self.api_key, &[YOUTUBE_API_KEY])?;
        let http = client(&self.base, self.timeout)?;

        let resp: SearchListResponse = invoke_json(http.get(
            "youtube/v3/search",
            RequestOpts {
                auth: Some(Auth::Query {
                    name: "key",
                    value: key.into(),
                }),
                query: Some(vec![
                    ("part", "snippet".into()),
                    ("q", "test".into()),
                    ("maxResults", "1".into()),
                ]),
                ..Default::default()
            },
        ))
        .await?;

        let total = resp
            .page_info
            .and_then(|p| p.total_results)
            .unwrap_or(0);
        Ok(Evidence::new(format!("Found {total} results")))
    }
}
