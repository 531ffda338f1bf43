//! Two-step Reddit check: client-credentials token exchange, then a listing
//! read with the issued bearer token. The listing is never requested unless
//! the exchange produced a token.
use crate::probe::{Probe, ProbeMeta, client, decode, expect_ok, invoke_json};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use smoke_common::{Evidence, FailureKind, ProbeFailure};
use smoke_config::{REDDIT_CLIENT_ID, REDDIT_CLIENT_SECRET, SmokeConfig};
use smoke_http::{Auth, RequestOpts};
use std::time::Duration;

pub const USER_AGENT_VALUE: &str = "research-dashboard/1.0";
pub const SUBREDDIT: &str = "Python";
const LISTING_LIMIT: &str = "5";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    data: Option<ListingData>,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<serde_json::Value>,
}

pub struct RedditProbe {
    client_id: Option<String>,
    client_secret: Option<String>,
    auth_base: String,
    api_base: String,
    timeout: Duration,
}

impl RedditProbe {
    pub fn from_config(cfg: &SmokeConfig) -> Self {
        Self {
            client_id: cfg.credentials.reddit_client_id.clone(),
            client_secret: cfg.credentials.reddit_client_secret.clone(),
            auth_base: cfg.endpoints.reddit_auth.clone(),
            api_base: cfg.endpoints.reddit_api.clone(),
            timeout: cfg.timeout(),
        }
    }

    fn headers() -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        h
    }

    async fn access_token(&self, id: &str, secret: &str) -> Result<String, ProbeFailure> {
        let http = client(&self.auth_base, self.timeout)?;
        let call = http.post_form(
            "api/v1/access_token",
            vec![
                ("grant_type", "client_credentials".into()),
                ("client_id", id.into()),
                ("client_secret", secret.into()),
            ],
            RequestOpts {
                auth: Some(Auth::Basic {
                    username: id,
                    password: secret,
                }),
                headers: Some(Self::headers()),
                ..Default::default()
            },
        );

        let reply = expect_ok(call).await.map_err(|f| match f.kind {
            FailureKind::Rejected => ProbeFailure::new(
                FailureKind::Rejected,
                format!("authentication failed: {}", f.message),
            ),
            _ => f,
        })?;
        let token: TokenResponse = decode(&reply)?;
        token.access_token.filter(|t| !t.is_empty()).ok_or_else(|| {
            ProbeFailure::new(
                FailureKind::Rejected,
                format!(
                    "authentication failed: {} - no access_token in response",
                    reply.status.as_u16()
                ),
            )
        })
    }
}

#[async_trait]
impl Probe for RedditProbe {
    fn meta(&self) -> ProbeMeta {
        ProbeMeta {
            name: "Reddit",
            label: "Reddit API",
            icon: "🔴",
            focus: "",
        }
    }

    async fn check(&self) -> Result<Evidence, ProbeFailure> {
        let names = [REDDIT_CLIENT_ID, REDDIT_CLIENT_SECRET];
        let (id, secret) = match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => (id.as_str(), secret.as_str()),
            (id, secret) => {
                // Report only the variables that are actually missing.
                let missing: Vec<&str> = [(id, names[0]), (secret, names[1])]
                    .into_iter()
                    .filter(|(v, _)| v.is_none())
                    .map(|(_, n)| n)
                    .collect();
                return Err(ProbeFailure::missing_credential(&missing));
            }
        };

        let token = self.access_token(id, secret).await?;
        tracing::debug!(probe = "Reddit", "reddit.token.issued");

        let http = client(&self.api_base, self.timeout)?;
        let listing: Listing = invoke_json(http.get(
            &format!("r/{SUBREDDIT}/hot"),
            RequestOpts {
                auth: Some(Auth::Bearer(&token)),
                headers: Some(Self::headers()),
                query: Some(vec![("limit", LISTING_LIMIT.into())]),
                ..Default::default()
            },
        ))
        .await?;

        let posts = listing.data.map(|d| d.children.len()).unwrap_or(0);
        Ok(Evidence::new(format!("Found {posts} posts")).with_note("Token exchange OK"))
    }
}
