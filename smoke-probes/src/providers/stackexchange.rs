use crate::probe::{Probe, ProbeMeta, client, invoke_json};
use async_trait::async_trait;
use serde::Deserialize;
use smoke_common::{Evidence, ProbeFailure};
use smoke_config::SmokeConfig;
use smoke_http::RequestOpts;
use std::time::Duration;

/// `;` means every tag must be present on the question.
pub const TAGS: [&str; 4] = [
    "machine-learning",
    "deep-learning",
    "artificial-intelligence",
    "neural-networks",
];
const PAGE_SIZE: &str = "10";
const SHOWN_TITLES: usize = 5;

#[derive(Debug, Deserialize)]
struct QuestionsPage {
    #[serde(default)]
    items: Vec<Question>,
    #[serde(default)]
    quota_remaining: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Question {
    #[serde(default)]
    title: Option<String>,
}

/// Recent-activity Stack Overflow questions under the AI/ML tag set.
pub struct StackExchangeProbe {
    base: String,
    timeout: Duration,
}

impl StackExchangeProbe {
    pub fn from_config(cfg: &SmokeConfig) -> Self {
        Self {
            base: cfg.endpoints.stackexchange.clone(),
            timeout: cfg.timeout(),
        }
    }
}

#[async_trait]
impl Probe for StackExchangeProbe {
    fn meta(&self) -> ProbeMeta {
        ProbeMeta {
            name: "Stack Exchange",
            label: "Stack Exchange API",
            icon: "📚",
            focus: " (AI/ML/DL filtered)",
        }
    }

    async fn check(&self) -> Result<Evidence, ProbeFailure> {
        let http = client(&self.base, self.timeout)?;

        let tagged = TAGS.join(";");
        let page: QuestionsPage = invoke_json(http.get(
            "2.3/questions",
            RequestOpts {
                query: Some(vec![
                    ("order", "desc".into()),
                    ("sort", "activity".into()),
                    ("tagged", tagged.as_str().into()),
                    ("site", "stackoverflow".into()),
                    ("pagesize", PAGE_SIZE.into()),
                ]),
                ..Default::default()
            },
        ))
        .await?;

        if page.items.is_empty() {
            return Err(ProbeFailure::empty("No AI/ML/DL questions found"));
        }

        let quota = page
            .quota_remaining
            .map(|q| q.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let titles = page
            .items
            .iter()
            .take(SHOWN_TITLES)
            .map(|q| q.title.clone().unwrap_or_else(|| "N/A".to_string()));

        Ok(
            Evidence::new(format!("Found {} AI/ML/DL questions", page.items.len()))
                .with_note(format!("Quota remaining: {quota}"))
                .with_items(titles),
        )
    }
}
