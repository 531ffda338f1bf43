//! Hacker News top stories, filtered down to AI/ML/DL titles.
//!
//! The scan is strictly sequential so the reported matches are always the
//! first ones in top-stories order. At most `1 + SCAN_LIMIT` requests are made.
use crate::probe::{Probe, ProbeMeta, client, invoke_json, transport};
use async_trait::async_trait;
use serde::Deserialize;
use smoke_common::{Evidence, ProbeFailure};
use smoke_config::SmokeConfig;
use smoke_http::{HttpClient, RequestOpts};
use std::collections::BTreeMap;
use std::time::Duration;

/// Lowercase substrings; a title matching any of them is relevant.
pub const AI_KEYWORDS: [&str; 12] = [
    "ai",
    "artificial intelligence",
    "machine learning",
    "deep learning",
    "neural",
    "llm",
    "gpt",
    "transformer",
    "nlp",
    "computer vision",
    "model",
    "algorithm",
];

pub const SCAN_LIMIT: usize = 30;
pub const MATCH_LIMIT: usize = 5;

/// Plain substring test against [`AI_KEYWORDS`], case-insensitive.
///
/// ```
/// use smoke_probes::providers::hackernews::is_relevant;
///
/// assert!(is_relevant("Show HN: A tiny LLM in Rust"));
/// assert!(!is_relevant("Rust 1.80 released"));
/// ```
pub fn is_relevant(title: &str) -> bool {
    let lower = title.to_lowercase();
    AI_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Firebase returns a plain array, or an index-keyed object when filtered.
/// An empty selection comes back as `null`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoryIds {
    List(Vec<u64>),
    Keyed(BTreeMap<String, u64>),
}

impl StoryIds {
    fn into_ordered(self) -> Vec<u64> {
        match self {
            StoryIds::List(ids) => ids,
            StoryIds::Keyed(map) => {
                let mut pairs: Vec<(u64, u64)> = map
                    .into_iter()
                    .filter_map(|(k, v)| k.parse::<u64>().ok().map(|idx| (idx, v)))
                    .collect();
                pairs.sort_by_key(|(idx, _)| *idx);
                pairs.into_iter().map(|(_, id)| id).collect()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    title: Option<String>,
}

pub struct HackerNewsProbe {
    base: String,
    timeout: Duration,
}

impl HackerNewsProbe {
    pub fn from_config(cfg: &SmokeConfig) -> Self {
        Self {
            base: cfg.endpoints.hackernews.clone(),
            timeout: cfg.timeout(),
        }
    }

    /// Title of one story, or `None` when the item is missing, not 200, or
    /// not decodable. Transport faults still abort the whole probe.
    async fn story_title(&self, http: &HttpClient, id: u64) -> Result<Option<String>, ProbeFailure> {
        let reply = http
            .get(&format!("v0/item/{id}.json"), RequestOpts::default())
            .await
            .map_err(transport)?;
        if !reply.is_ok() {
            tracing::debug!(id, status = %reply.status, "hackernews.item.skipped");
            return Ok(None);
        }
        match reply.json::<Option<Item>>() {
            Ok(item) => Ok(item.and_then(|i| i.title)),
            Err(e) => {
                tracing::debug!(id, error = %e, "hackernews.item.undecodable");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl Probe for HackerNewsProbe {
    fn meta(&self) -> ProbeMeta {
        ProbeMeta {
            name: "Hacker News",
            label: "Hacker News API",
            icon: "📰",
            focus: " (AI/ML/DL filtered)",
        }
    }

    async fn check(&self) -> Result<Evidence, ProbeFailure> {
        let http = client(&self.base, self.timeout)?;

        let limit = SCAN_LIMIT.to_string();
        let ids: Option<StoryIds> = invoke_json(http.get(
            "v0/topstories.json",
            RequestOpts {
                query: Some(vec![
                    ("limitToFirst", limit.as_str().into()),
                    ("orderBy", "\"$key\"".into()),
                ]),
                ..Default::default()
            },
        ))
        .await?;
        let ids = ids.map(StoryIds::into_ordered).unwrap_or_default();
        if ids.is_empty() {
            return Err(ProbeFailure::empty("No stories found"));
        }

        let mut matches: Vec<String> = Vec::with_capacity(MATCH_LIMIT);
        for id in ids.into_iter().take(SCAN_LIMIT) {
            let Some(title) = self.story_title(&http, id).await? else {
                continue;
            };
            if is_relevant(&title) {
                tracing::debug!(id, title = %title, "hackernews.item.match");
                matches.push(title);
                if matches.len() >= MATCH_LIMIT {
                    break;
                }
            }
        }

        if matches.is_empty() {
            return Err(ProbeFailure::empty(format!(
                "No AI/ML/DL stories found in top {SCAN_LIMIT}"
            )));
        }
        Ok(Evidence::new(format!("Found {} AI/ML/DL stories", matches.len())).with_items(matches))
    }
}
