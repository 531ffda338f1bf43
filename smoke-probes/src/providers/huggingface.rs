use crate::probe::{Probe, ProbeMeta, client, invoke_json, require};
use async_trait::async_trait;
use serde::Serialize;
use smoke_common::{Evidence, ProbeFailure, truncate_chars};
use smoke_config::{HUGGINGFACE_API_KEY, SmokeConfig};
use smoke_http::{Auth, RequestOpts};
use std::time::Duration;

pub const MODEL: &str = "meta-llama/Llama-3.2-1B-Instruct";
const PROMPT: &str = "Hello, this is a test.";
const MAX_TOKENS: u32 = 10;
const EVIDENCE_CHARS: usize = 100;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat completion through the HuggingFace inference router.
pub struct HuggingFaceProbe {
    api_key: Option<String>,
    base: String,
    timeout: Duration,
}

impl HuggingFaceProbe {
    pub fn from_config(cfg: &SmokeConfig) -> Self {
        Self {
            api_key: cfg.credentials.huggingface_api_key.clone(),
            base: cfg.endpoints.huggingface.clone(),
            timeout: cfg.timeout(),
        }
    }
}

#[async_trait]
impl Probe for HuggingFaceProbe {
    fn meta(&self) -> ProbeMeta {
        ProbeMeta {
            name: "HuggingFace",
            label: "HuggingFace API",
            icon: "🤗",
            focus: "",
        }
    }

    async fn check(&self) -> Result<Evidence, ProbeFailure> {
        let key = require(&self.api_key, &[HUGGINGFACE_API_KEY])?;
        let http = client(&self.base, self.timeout)?;

        let req = ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: PROMPT,
            }],
            max_tokens: MAX_TOKENS,
        };

        let body: serde_json::Value = invoke_json(http.post_json(
            "v1/chat/completions",
            &req,
            RequestOpts {
                auth: Some(Auth::Bearer(key)),
                ..Default::default()
            },
        ))
        .await?;

        let rendered = body.to_string();
        Ok(Evidence::new(format!(
            "Response: {}...",
            truncate_chars(&rendered, EVIDENCE_CHARS)
        )))
    }
}
