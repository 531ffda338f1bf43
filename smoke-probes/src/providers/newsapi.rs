use crate::probe::{Probe, ProbeMeta, client, invoke_json, require};
use async_trait::async_trait;
use serde::Deserialize;
use smoke_common::{Evidence, ProbeFailure};
use smoke_config::{NEWSAPI_KEY, NEWS_API_KEY, SmokeConfig};
use smoke_http::{Auth, RequestOpts};
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeadlinesResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    total_results: Option<u64>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    title: Option<String>,
}

/// US top headlines, one article.
pub struct NewsApiProbe {
    api_key: Option<String>,
    base: String,
    timeout: Duration,
}

impl NewsApiProbe {
    pub fn from_config(cfg: &SmokeConfig) -> Self {
        Self {
            api_key: cfg.credentials.newsapi_key.clone(),
            base: cfg.endpoints.newsapi.clone(),
            timeout: cfg.timeout(),
        }
    }
}

#[async_trait]
impl Probe for NewsApiProbe {
    fn meta(&self) -> ProbeMeta {
        ProbeMeta {
            name: "News API",
            label: "News API",
            icon: "📰",
            focus: "",
        }
    }

    async fn check(&self) -> Result<Evidence, ProbeFailure> {
        let key = require(&self.api_key, &[NEWSAPI_KEY, NEWS_API_KEY])?;
        let http = client(&self.base, self.timeout)?;

        let resp: HeadlinesResponse = invoke_json(http.get(
            "v2/top-headlines",
            RequestOpts {
                auth: Some(Auth::Query {
                    name: "apiKey",
                    value: key.into(),
                }),
                query: Some(vec![("country", "us".into()), ("pageSize", "1".into())]),
                ..Default::default()
            },
        ))
        .await?;

        let status = resp.status.as_deref().unwrap_or("None");
        let mut evidence = Evidence::new(format!(
            "Status: {status}, Total: {} articles",
            resp.total_results.unwrap_or(0)
        ));
        if let Some(first) = resp.articles.first() {
            let title = first.title.as_deref().unwrap_or("N/A");
            evidence = evidence.with_note(format!("Sample headline: {title}"));
        }
        Ok(evidence)
    }
}
