#![allow(dead_code)]

use smoke_common::observability::{LogConfig, LogFormat, init_logging};
use smoke_config::{Credentials, Endpoints, SmokeConfig};
use std::sync::OnceLock;

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "api-smoke-tests",
            log_dir: Some(std::env::temp_dir().join("api-smoke-tests")),
            emit_stderr: true,
            format: LogFormat::parse(&std::env::var("SMOKE_LOG_FORMAT").unwrap_or_default()),
            default_filter: "debug",
        };
        init_logging(config).unwrap_or_default()
    });
}

/// Every credential present with recognisable fake values.
pub fn full_credentials() -> Credentials {
    Credentials {
        huggingface_api_key: Some("hf_test".into()),
        x_bearer_token: Some("x_test".into()),
        youtube_api_key: Some("yt_test".into()),
        newsapi_key: Some("news_test".into()),
        reddit_client_id: Some("rid".into()),
        reddit_client_secret: Some("rsecret".into()),
    }
}

/// All endpoints pointed at `base` with a short timeout.
pub fn config_for(base: &str, credentials: Credentials) -> SmokeConfig {
    SmokeConfig {
        timeout_secs: 1,
        endpoints: Endpoints::all(base),
        credentials,
        ..SmokeConfig::default()
    }
}
