//! Minimal HTTP client for one-shot probes with safe logging and flexible auth.
//!
//! - Request options: headers, `Auth`, query params, timeout
//! - JSON or form-encoded bodies
//! - Any HTTP status is returned as an [`HttpReply`]; classifying it is the
//!   caller's job. Only URL/build/network faults surface as [`HttpError`].
//! - Redacts sensitive headers, query params and form fields in every log line
//! - Optional *raw* request/response logging via `SMOKE_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), smoke_http::HttpError> {
//! let client = smoke_http::HttpClient::new("https://api.example.com")?;
//! let reply = client
//!     .get("v1/items", smoke_http::RequestOpts::default())
//!     .await?;
//! if reply.is_ok() {
//!     let got: serde_json::Value = reply.json()?;
//! #   let _ = got;
//! }
//! # Ok(()) }
//! ```
//!
//! Security: `Auth::Bearer` values are sanitized before use, and logs only
//! ever include the auth kind (bearer/basic/query/none), not the secret.
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), non-success replies, and
//! (optionally) raw request/response lines (target `http.raw`).

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "SMOKE_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)
const SNIPPET_MAX: usize = 500;
const REDACTED: &str = "<redacted>";

static REQ_SEQ: AtomicU64 = AtomicU64::new(1);

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn is_secret_key(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "access_token"
            | "authorization"
            | "auth"
            | "key"
            | "apikey"
            | "api_key"
            | "token"
            | "secret"
            | "client_secret"
            | "bearer"
            | "password"
    )
}

fn redact_pairs(pairs: &[(&str, Cow<'_, str>)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| {
            let v = if is_secret_key(k) {
                REDACTED.to_string()
            } else {
                v.as_ref().to_string()
            };
            ((*k).to_string(), v)
        })
        .collect()
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(
    method: &Method,
    url: &Url,
    headers: &HeaderMap,
    query: &[(String, String)],
    body: Option<&str>,
) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{}", method)];
    for (name, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
    }
    if let Some(s) = body {
        let mut s = s.to_string();
        if s.len() > RAW_MAX_BODY {
            s.truncate(floor_char_boundary(&s, RAW_MAX_BODY));
            s.push('…');
        }
        parts.push(format!("-d '{}'", s.replace('\'', r"'\''")));
    }
    let mut shown = url.clone();
    if !query.is_empty() {
        shown
            .query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    parts.push(format!("'{}'", shown.as_str()));
    parts.join(" ")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let mut val = v.to_str().unwrap_or("").to_string();
            if key.eq_ignore_ascii_case("authorization") {
                val = REDACTED.into();
            }
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
}

// ==============================
// Auth, body & request options
// ==============================

/// Authentication strategies supported by the HTTP client helpers.
///
/// ```
/// use smoke_http::Auth;
///
/// let bearer = Auth::Bearer("token");
/// match bearer {
///     Auth::Bearer(value) => assert_eq!(value, "token"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Authorization: Bearer <token>
    Bearer(&'a str),
    /// Authorization: Basic base64(<username>:<password>)
    Basic {
        username: &'a str,
        password: &'a str,
    },
    /// Auth via query param (e.g. YouTube `key`, NewsAPI `apiKey`)
    Query {
        name: &'a str,
        value: Cow<'a, str>,
    },
    None,
}

impl Auth<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Auth::Bearer(_) => "bearer",
            Auth::Basic { .. } => "basic",
            Auth::Query { .. } => "query",
            Auth::None => "none",
        }
    }
}

/// Request payload.
#[derive(Clone, Debug)]
pub enum RequestBody<'a> {
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded`
    Form(Vec<(&'a str, Cow<'a, str>)>),
}

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use smoke_http::{Auth, RequestOpts};
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     auth: Some(Auth::Query {
///         name: "apiKey",
///         value: Cow::Borrowed("demo"),
///     }),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.query.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>, // e.g. [("q", "term".into())]
}

// ==============================
// Reply
// ==============================

/// A fully-read response, whatever its status.
#[derive(Clone, Debug)]
pub struct HttpReply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpReply {
    /// Exactly `200 OK`; other 2xx codes are not treated as success.
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Decode the body as JSON.
    ///
    /// ```
    /// use smoke_http::HttpReply;
    /// use reqwest::{header::HeaderMap, StatusCode};
    ///
    /// let reply = HttpReply {
    ///     status: StatusCode::OK,
    ///     headers: HeaderMap::new(),
    ///     body: br#"{"n": 3}"#.to_vec(),
    /// };
    /// let v: serde_json::Value = reply.json().unwrap();
    /// assert_eq!(v["n"], 3);
    /// ```
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_slice::<T>(&self.body).map_err(|e| {
            let snippet = snip_body(&self.body);
            tracing::warn!(
                serde_line=%e.line(),
                serde_col=%e.column(),
                serde_err=%e,
                body_snippet=%snippet,
                "http.response.decode_error"
            );
            HttpError::Decode(e.to_string(), snippet)
        })
    }

    /// Lossy UTF-8 view of the whole body.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body truncated for diagnostics.
    pub fn snippet(&self) -> String {
        snip_body(&self.body)
    }

    /// Best-effort human message from a provider error envelope.
    pub fn error_message(&self) -> String {
        extract_error_message_multi(&self.body)
    }
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use smoke_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(10));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(10),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    ///
    /// ```no_run
    /// use smoke_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?
    ///     .with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// GET with per-request options.
    pub async fn get(&self, path: &str, opts: RequestOpts<'_>) -> Result<HttpReply, HttpError> {
        self.send(Method::GET, path, None, opts).await
    }

    /// POST a JSON body.
    pub async fn post_json<B>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<HttpReply, HttpError>
    where
        B: serde::Serialize + ?Sized,
    {
        let value = serde_json::to_value(body).map_err(|e| HttpError::Build(e.to_string()))?;
        self.send(Method::POST, path, Some(RequestBody::Json(value)), opts)
            .await
    }

    /// POST an `application/x-www-form-urlencoded` body.
    pub async fn post_form<'a>(
        &self,
        path: &str,
        form: Vec<(&'a str, Cow<'a, str>)>,
        opts: RequestOpts<'a>,
    ) -> Result<HttpReply, HttpError> {
        self.send(Method::POST, path, Some(RequestBody::Form(form)), opts)
            .await
    }

    // ==============================
    // Core request implementation
    // ==============================

    /// Send one request and read the full body. Never retries.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody<'_>>,
        opts: RequestOpts<'_>,
    ) -> Result<HttpReply, HttpError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;

        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let mut rb = self.inner.request(method.clone(), url.clone()).timeout(timeout);

        // query (caller params first, then query-auth)
        let mut query = opts.query.clone().unwrap_or_default();
        if let Some(Auth::Query { name, value }) = &opts.auth {
            query.push((*name, value.clone()));
        }
        if !query.is_empty() {
            let pairs: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_ref())).collect();
            rb = rb.query(&pairs);
        }

        // body (keep a loggable rendition; form secrets are redacted)
        let mut loggable_body: Option<String> = None;
        match &body {
            Some(RequestBody::Json(value)) => {
                let bytes =
                    serde_json::to_vec(value).map_err(|e| HttpError::Build(e.to_string()))?;
                loggable_body = Some(String::from_utf8_lossy(&bytes).into_owned());
                rb = rb
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(bytes);
            }
            Some(RequestBody::Form(fields)) => {
                let pairs: Vec<(&str, &str)> =
                    fields.iter().map(|(k, v)| (*k, v.as_ref())).collect();
                loggable_body = Some(
                    redact_pairs(fields)
                        .into_iter()
                        .map(|(k, v)| format!("{k}={v}"))
                        .collect::<Vec<_>>()
                        .join("&"),
                );
                rb = rb.form(&pairs);
            }
            None => {}
        }

        // headers
        if let Some(hdrs) = &opts.headers {
            rb = rb.headers(hdrs.clone());
        }

        // auth
        match &opts.auth {
            Some(Auth::Bearer(tok)) => {
                let tok = sanitize_api_key(tok)?;
                rb = rb.bearer_auth(tok);
            }
            Some(Auth::Basic { username, password }) => {
                rb = rb.basic_auth(username, Some(password));
            }
            Some(Auth::Query { .. }) | Some(Auth::None) | None => {}
        }

        // ----- Safe request logging (pre-send) -----
        let auth_kind = opts.auth.as_ref().map(Auth::kind).unwrap_or("none");
        let redacted_q = redact_pairs(&query);
        let req_id = format!("r{}", REQ_SEQ.fetch_add(1, Ordering::Relaxed));

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            query=?redacted_q,
            timeout_ms=timeout.as_millis() as u64,
            auth_kind,
            has_body=%body.is_some(),
            "http.request.start"
        );

        if raw_enabled() {
            let curl = make_curl(
                &method,
                &url,
                opts.headers.as_ref().unwrap_or(&HeaderMap::new()),
                &redacted_q,
                loggable_body.as_deref(),
            );
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = Instant::now();
        let resp = rb.send().await.map_err(|err| {
            let e = classify_reqwest_error(err, timeout);
            tracing::warn!(req_id=%req_id, error=%e, "http.network_error.send");
            e
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|err| {
            let e = classify_reqwest_error(err, timeout);
            tracing::warn!(req_id=%req_id, error=%e, "http.network_error.body");
            e
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let req_hdr_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();
        let remain = headers
            .get("x-rate-limit-remaining")
            .or_else(|| headers.get("x-ratelimit-remaining"))
            .and_then(|v| v.to_str().ok());

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%req_hdr_id,
            rate_limit.remaining=?remain,
            "http.response.headers"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&headers);
            let truncated = bytes.len() > RAW_MAX_BODY;
            let shown = &bytes[..bytes.len().min(RAW_MAX_BODY)];
            let text = String::from_utf8_lossy(shown);
            tracing::info!(
                target:"http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?hdrs,
                body=%text,
                truncated
            );
        }

        let reply = HttpReply {
            status,
            headers,
            body: bytes.to_vec(),
        };

        tracing::trace!(
            req_id=%req_id,
            body_snippet=%reply.snippet(),
            "http.response.body_snippet"
        );

        if !status.is_success() {
            tracing::warn!(
                req_id=%req_id,
                %status,
                message=%reply.error_message(),
                x_request_id=%req_hdr_id,
                "http.error"
            );
        }

        Ok(reply)
    }
}

// ==============================
// Helpers
// ==============================

fn classify_reqwest_error(err: reqwest::Error, timeout: Duration) -> HttpError {
    if err.is_timeout() {
        return HttpError::Timeout(timeout);
    }
    if err.is_builder() {
        return HttpError::Build(err.to_string());
    }
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    HttpError::Network(message)
}

fn extract_error_message_multi(body: &[u8]) -> String {
    // OpenAI/HF router style: {"error":{"message":"..."}}
    #[derive(Deserialize)]
    struct OpenAiEnv {
        error: OpenAiDetail,
    }
    #[derive(Deserialize)]
    struct OpenAiDetail {
        message: String,
    }

    // Twitter: {"errors":[{"message":"...", "detail":"...", "title":"..."}]}
    #[derive(Deserialize)]
    struct TwErrors {
        errors: Vec<TwErr>,
    }
    #[derive(Deserialize)]
    struct TwErr {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        title: String,
    }

    // YouTube: {"error":{"code":403,"message":"..."}} is covered above.
    // StackExchange: {"error_message":"..."}; generic: message/detail/error
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
        #[serde(default)]
        error_message: String,
    }

    if let Ok(env) = serde_json::from_slice::<OpenAiEnv>(body) {
        return env.error.message;
    }
    if let Ok(tw) = serde_json::from_slice::<TwErrors>(body) {
        if let Some(first) = tw.errors.into_iter().next() {
            for s in [first.message, first.detail, first.title] {
                if !s.is_empty() {
                    return s;
                }
            }
        }
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        for s in [m.message, m.detail, m.error, m.error_message] {
            if !s.is_empty() {
                return s;
            }
        }
    }
    snip_body(body)
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > SNIPPET_MAX {
        snip.truncate(floor_char_boundary(&snip, SNIPPET_MAX));
        snip.push_str("...");
    }
    snip
}

fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    // 1) Trim outer spaces/quotes
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();

    // 2) Remove *all* ASCII whitespace (spaces, tabs, newlines, carriage returns)
    s.retain(|ch| !ch.is_ascii_whitespace());

    // 3) Ensure ASCII and no control chars
    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }

    // 4) Validate header value upfront for clear errors
    HeaderValue::from_str(&format!("Bearer {}", s))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}
