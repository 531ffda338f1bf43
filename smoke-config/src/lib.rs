//! Loader for smoke-run configuration: YAML + `SMOKE__` environment overlays,
//! plus credential resolution from the process environment and a local
//! `.env` file.
//!
//! Precedence for tunables (timeout, endpoints): defaults < YAML < `SMOKE__*`.
//! Precedence for credentials: env file < process environment. The env file is
//! parsed, never exported, so loading it leaves global state untouched.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const HUGGINGFACE_API_KEY: &str = "HUGGINGFACE_API_KEY";
pub const X_BEARER_TOKEN: &str = "X_BEARER_TOKEN";
pub const TWITTER_BEARER_TOKEN: &str = "TWITTER_BEARER_TOKEN";
pub const YOUTUBE_API_KEY: &str = "YOUTUBE_API_KEY";
pub const NEWSAPI_KEY: &str = "NEWSAPI_KEY";
pub const NEWS_API_KEY: &str = "NEWS_API_KEY";
pub const REDDIT_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const REDDIT_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";

pub const DEFAULT_ENV_FILE: &str = "backend/.env";
pub const DEFAULT_CONFIG_FILE: &str = "smoke.yaml";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmokeConfig {
    /// Per-request timeout applied to every probe call.
    pub timeout_secs: u64,
    /// Where credentials are read from when the process env lacks them.
    pub env_file: PathBuf,
    pub endpoints: Endpoints,
    #[serde(skip)]
    pub credentials: Credentials,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            env_file: PathBuf::from(DEFAULT_ENV_FILE),
            endpoints: Endpoints::default(),
            credentials: Credentials::default(),
        }
    }
}

impl SmokeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Base URLs, one per upstream host. Paths are fixed by each probe.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Endpoints {
    pub huggingface: String,
    pub twitter: String,
    pub youtube: String,
    pub newsapi: String,
    pub reddit_auth: String,
    pub reddit_api: String,
    pub hackernews: String,
    pub stackexchange: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            huggingface: "https://router.huggingface.co/".into(),
            twitter: "https://api.twitter.com/".into(),
            youtube: "https://www.googleapis.com/".into(),
            newsapi: "https://newsapi.org/".into(),
            reddit_auth: "https://www.reddit.com/".into(),
            reddit_api: "https://oauth.reddit.com/".into(),
            hackernews: "https://hacker-news.firebaseio.com/".into(),
            stackexchange: "https://api.stackexchange.com/".into(),
        }
    }
}

impl Endpoints {
    /// Point every provider at one base URL (mock servers, local proxies).
    pub fn all(base: &str) -> Self {
        Self {
            huggingface: base.into(),
            twitter: base.into(),
            youtube: base.into(),
            newsapi: base.into(),
            reddit_auth: base.into(),
            reddit_api: base.into(),
            hackernews: base.into(),
            stackexchange: base.into(),
        }
    }
}

/// Secrets needed by the authenticated probes. Read-only once resolved.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub huggingface_api_key: Option<String>,
    pub x_bearer_token: Option<String>,
    pub youtube_api_key: Option<String>,
    pub newsapi_key: Option<String>,
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
}

impl Credentials {
    /// Resolve every credential through `lookup`. Empty values count as absent;
    /// alternatives are tried in order.
    ///
    /// ```
    /// use smoke_config::Credentials;
    ///
    /// let creds = Credentials::from_lookup(|name| match name {
    ///     "X_BEARER_TOKEN" => Some(String::new()),
    ///     "TWITTER_BEARER_TOKEN" => Some("tw".into()),
    ///     _ => None,
    /// });
    /// assert_eq!(creds.x_bearer_token.as_deref(), Some("tw"));
    /// assert!(creds.youtube_api_key.is_none());
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|&n| lookup(n))
                .find(|v| !v.trim().is_empty())
        };
        Self {
            huggingface_api_key: first(&[HUGGINGFACE_API_KEY]),
            x_bearer_token: first(&[X_BEARER_TOKEN, TWITTER_BEARER_TOKEN]),
            youtube_api_key: first(&[YOUTUBE_API_KEY]),
            newsapi_key: first(&[NEWSAPI_KEY, NEWS_API_KEY]),
            reddit_client_id: first(&[REDDIT_CLIENT_ID]),
            reddit_client_secret: first(&[REDDIT_CLIENT_SECRET]),
        }
    }

    /// Process environment first, then the env file. A missing file is fine.
    pub fn resolve(env_file: &Path) -> Self {
        let file_vars = read_env_file(env_file);
        Self::from_lookup(|name| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| {
                    file_vars
                        .iter()
                        .find(|(k, _)| k == name)
                        .map(|(_, v)| v.clone())
                })
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn state(v: &Option<String>) -> &'static str {
            if v.is_some() { "<set>" } else { "<unset>" }
        }
        f.debug_struct("Credentials")
            .field("huggingface_api_key", &state(&self.huggingface_api_key))
            .field("x_bearer_token", &state(&self.x_bearer_token))
            .field("youtube_api_key", &state(&self.youtube_api_key))
            .field("newsapi_key", &state(&self.newsapi_key))
            .field("reddit_client_id", &state(&self.reddit_client_id))
            .field("reddit_client_secret", &state(&self.reddit_client_secret))
            .finish()
    }
}

/// Variable names shown in the closing hint block, in probe order.
pub fn credential_hints() -> Vec<String> {
    vec![
        HUGGINGFACE_API_KEY.to_string(),
        format!("{X_BEARER_TOKEN} or {TWITTER_BEARER_TOKEN}"),
        YOUTUBE_API_KEY.to_string(),
        format!("{NEWSAPI_KEY} or {NEWS_API_KEY}"),
        format!("{REDDIT_CLIENT_ID} and {REDDIT_CLIENT_SECRET}"),
    ]
}

fn read_env_file(path: &Path) -> Vec<(String, String)> {
    let iter = match dotenv::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) => {
            tracing::debug!(path=%path.display(), error=%e, "config.env_file.unavailable");
            return Vec::new();
        }
    };
    let mut vars = Vec::new();
    for item in iter {
        match item {
            Ok(pair) => vars.push(pair),
            Err(e) => {
                tracing::warn!(path=%path.display(), error=%e, "config.env_file.bad_line");
            }
        }
    }
    tracing::debug!(path=%path.display(), count = vars.len(), "config.env_file.loaded");
    vars
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct SmokeConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env_file: Option<PathBuf>,
}

impl Default for SmokeConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SmokeConfigLoader {
    /// Start from built-in defaults; `SMOKE__` env overrides are layered on
    /// top of every file source at [`SmokeConfigLoader::load`].
    ///
    /// ```
    /// use smoke_config::SmokeConfigLoader;
    ///
    /// let cfg = SmokeConfigLoader::new()
    ///     .with_yaml_str("timeout_secs: 3")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(cfg.timeout_secs, 3);
    /// assert_eq!(cfg.endpoints.twitter, "https://api.twitter.com/");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            env_file: None,
        }
    }

    /// Attach an optional YAML/TOML/JSON file; absence is not an error.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet (tests, embedded defaults).
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Override the env file location regardless of what YAML says.
    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Merge all sources and resolve credentials.
    pub fn load(self) -> Result<SmokeConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("SMOKE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let mut typed: SmokeConfig = cfg.try_deserialize()?;
        if let Some(env_file) = self.env_file {
            typed.env_file = env_file;
        }
        if typed.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        typed.credentials = Credentials::resolve(&typed.env_file);
        Ok(typed)
    }
}
