//! HTTP client for the chirp connectors with safe logging and OAuth 1.0a signing.
//!
//! - Request options: headers, `Auth`, query params, form body, expected status
//! - Redacts sensitive parameters and never logs secret values
//! - One request per call: no retries, no client-imposed timeouts
//! - Optional *raw* request/response logging via `CHIRP_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust,no_run
//! # async fn demo() -> Result<(), chirp_http::HttpError> {
//! use chirp_http::{Auth, HttpClient, RequestOpts, Signer};
//!
//! let client = HttpClient::new("https://api.twitter.com/")?;
//! let signer = Signer::new("consumer-key", "consumer-secret").with_token("token", "secret");
//! let got: serde_json::Value = client
//!     .get_json(
//!         "1.1/users/show.json",
//!         RequestOpts {
//!             auth: Some(Auth::oauth1(&signer)),
//!             query: Some(vec![("screen_name", "jack".into())]),
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and (optionally)
//! raw request/response lines (target `http.raw`) when `CHIRP_HTTP_RAW=1`.

pub mod oauth;

pub use oauth::{Signer, Token};

use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::env;
use thiserror::Error;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "CHIRP_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;

/// Parameter names whose values never reach the logs.
const SECRET_PARAMS: &[&str] = &[
    "x_auth_password",
    "oauth_token_secret",
    "oauth_verifier",
    "access_token",
    "token",
    "secret",
];

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Name/value pairs used for query strings, form bodies and OAuth extras.
pub type Params<'a> = Vec<(&'a str, Cow<'a, str>)>;

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
    #[error("decode error: {message}, body_snippet: {snippet}")]
    Decode { message: String, snippet: String },
    #[error("expected status {expected}, server returned {status}: {message}, request_id={request_id}")]
    Status {
        expected: StatusCode,
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    /// The response status, when the failure came from a status mismatch.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ==============================
// Auth & Request Options
// ==============================

/// Authentication strategies supported by the client.
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// OAuth 1.0a `Authorization` header. `extras` are additional protocol
    /// parameters (`oauth_callback`, `oauth_verifier`, ...).
    OAuth1 {
        signer: &'a Signer,
        extras: Params<'a>,
    },
    None,
}

impl<'a> Auth<'a> {
    pub fn oauth1(signer: &'a Signer) -> Self {
        Auth::OAuth1 {
            signer,
            extras: Vec::new(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Auth::OAuth1 { .. } => "oauth1",
            Auth::None => "none",
        }
    }
}

/// Per-request knobs.
///
/// ```
/// use chirp_http::RequestOpts;
/// use reqwest::StatusCode;
///
/// let opts = RequestOpts {
///     query: Some(vec![("q", "rust".into())]),
///     expect_status: Some(StatusCode::CREATED),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.expected(), StatusCode::CREATED);
/// assert!(!opts.allow_absolute);
/// assert_eq!(RequestOpts::default().expected(), StatusCode::OK);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Params<'a>>,
    /// Sent as an `application/x-www-form-urlencoded` body.
    pub form: Option<Params<'a>>,
    /// Status that counts as success; anything else is `HttpError::Status`.
    /// Defaults to `200 OK`.
    pub expect_status: Option<StatusCode>,
    /// If true and `path` is an absolute URL, use it as-is (ignore base).
    pub allow_absolute: bool,
}

impl RequestOpts<'_> {
    pub fn expected(&self) -> StatusCode {
        self.expect_status.unwrap_or(StatusCode::OK)
    }
}

// ==============================
// Client
// ==============================

/// A `reqwest::Client` anchored to a base URL.
#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Url,
    inner: Client,
}

impl HttpClient {
    /// Construct a client with a default `reqwest::Client`.
    ///
    /// ```
    /// use chirp_http::{HttpClient, HttpError};
    ///
    /// let client = HttpClient::new("https://api.twitter.com/")?;
    /// assert_eq!(client.base().as_str(), "https://api.twitter.com/");
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let inner = Client::builder()
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Self::with_client(inner, base)
    }

    /// Wrap a caller-supplied client; its pooling and timeout policy apply.
    pub fn with_client(inner: Client, base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        Ok(Self { base, inner })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// GET and decode a JSON body.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_json(Method::GET, path, opts).await
    }

    /// POST the form in `opts` and decode a JSON body.
    pub async fn post_form_json<T>(
        &self,
        path: &str,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_json(Method::POST, path, opts).await
    }

    /// POST the form in `opts` and return the body as text.
    pub async fn post_form_text(
        &self,
        path: &str,
        opts: RequestOpts<'_>,
    ) -> Result<String, HttpError> {
        self.request_text(Method::POST, path, opts).await
    }

    /// GET and return the raw body.
    pub async fn get_bytes(&self, path: &str, opts: RequestOpts<'_>) -> Result<Bytes, HttpError> {
        self.execute(Method::GET, path, opts).await
    }

    pub async fn request_json<T>(
        &self,
        method: Method,
        path: &str,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let bytes = self.execute(method, path, opts).await?;
        serde_json::from_slice::<T>(&bytes).map_err(|e| {
            let snippet = snip_body(&bytes);
            tracing::warn!(
                serde_line=%e.line(),
                serde_col=%e.column(),
                serde_err=%e,
                body_snippet=%snippet,
                "http.response.decode_error"
            );
            HttpError::Decode {
                message: e.to_string(),
                snippet,
            }
        })
    }

    pub async fn request_text(
        &self,
        method: Method,
        path: &str,
        opts: RequestOpts<'_>,
    ) -> Result<String, HttpError> {
        let bytes = self.execute(method, path, opts).await?;
        String::from_utf8(bytes.to_vec()).map_err(|e| HttpError::Decode {
            message: e.to_string(),
            snippet: snip_body(&bytes),
        })
    }

    fn resolve(&self, path: &str, allow_absolute: bool) -> Result<Url, HttpError> {
        if allow_absolute {
            if let Ok(abs) = Url::parse(path) {
                return Ok(abs);
            }
        }
        self.base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn execute(
        &self,
        method: Method,
        path: &str,
        opts: RequestOpts<'_>,
    ) -> Result<Bytes, HttpError> {
        let mut url = self.resolve(path, opts.allow_absolute)?;
        if let Some(q) = opts.query.as_deref().filter(|q| !q.is_empty()) {
            url.query_pairs_mut()
                .extend_pairs(q.iter().map(|(k, v)| (*k, v.as_ref())));
        }
        let expected = opts.expected();
        let form = opts.form.as_deref().unwrap_or(&[]);

        let mut rb = self.inner.request(method.clone(), url.clone());

        let mut request_body: Option<String> = None;
        if opts.form.is_some() {
            let body = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(form.iter().map(|(k, v)| (*k, v.as_ref())))
                .finish();
            rb = rb
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(body.clone());
            request_body = Some(body);
        }

        if let Some(hdrs) = &opts.headers {
            rb = rb.headers(hdrs.clone());
        }

        if let Some(Auth::OAuth1 { signer, extras }) = &opts.auth {
            let header = signer.authorization(&method, &url, form, extras);
            let value = HeaderValue::from_str(&header)
                .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
            rb = rb.header(AUTHORIZATION, value);
        }

        // ----- Safe request logging (pre-send) -----
        let auth_kind = opts.auth.as_ref().map(Auth::kind).unwrap_or("none");
        let req_id = format!(
            "r{:x}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );
        let (host_path, redacted_q) = redact_query(&url);

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%host_path,
            query=?redacted_q,
            form=?redact_params(form),
            auth_kind,
            expected=%expected,
            "http.request.start"
        );

        if raw_enabled() {
            let redacted_body = request_body.as_ref().map(|_| redacted_form_body(form));
            let curl = make_curl(&method, &url, opts.headers.as_ref(), redacted_body.as_deref());
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = std::time::Instant::now();
        let resp = rb.send().await.map_err(|err| {
            tracing::warn!(req_id=%req_id, message=%err, "http.network_error.send");
            HttpError::Network(err.to_string())
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|err| {
            tracing::warn!(req_id=%req_id, message=%err, "http.network_error.body");
            HttpError::Network(err.to_string())
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let request_id = header_str(&headers, "x-request-id")
            .or_else(|| header_str(&headers, "x-transaction-id"))
            .unwrap_or("-")
            .to_string();

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%request_id,
            rate_limit.limit=?header_str(&headers, "x-rate-limit-limit"),
            rate_limit.remaining=?header_str(&headers, "x-rate-limit-remaining"),
            rate_limit.reset=?header_str(&headers, "x-rate-limit-reset"),
            "http.response.headers"
        );

        if raw_enabled() {
            let truncated = bytes.len() > RAW_MAX_BODY;
            let text = String::from_utf8_lossy(&bytes[..bytes.len().min(RAW_MAX_BODY)]);
            tracing::info!(
                target: "http.raw",
                %req_id,
                %status,
                duration_ms=dur_ms,
                body=%text,
                truncated
            );
        }

        if status == expected {
            tracing::trace!(
                req_id=%req_id,
                body_snippet=%snip_body(&bytes),
                "http.response.body_snippet"
            );
            return Ok(bytes);
        }

        let message = extract_error_message(&bytes);
        tracing::warn!(
            req_id=%req_id,
            %status,
            %expected,
            message=%message,
            x_request_id=%request_id,
            "http.error"
        );
        Err(HttpError::Status {
            expected,
            status,
            message,
            request_id,
        })
    }
}

// ==============================
// Helpers
// ==============================

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn is_secret(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    SECRET_PARAMS.contains(&lower.as_str())
}

fn redact_value(name: &str, value: &str) -> String {
    if is_secret(name) {
        "<redacted>".to_string()
    } else {
        value.to_string()
    }
}

fn redact_params(params: &[(&str, Cow<'_, str>)]) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(k, v)| ((*k).to_string(), redact_value(k, v)))
        .collect()
}

fn redacted_form_body(params: &[(&str, Cow<'_, str>)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(redact_params(params))
        .finish()
}

/// "host + path" and the redacted query list, for logging.
fn redact_query(url: &Url) -> (String, Vec<(String, String)>) {
    let host_path = format!("{}{}", url.host_str().unwrap_or("-"), url.path());
    let redacted = url
        .query_pairs()
        .map(|(k, v)| (k.to_string(), redact_value(&k, &v)))
        .collect();
    (host_path, redacted)
}

/// Best-effort curl command for repro/debug. Callers pass an already
/// redacted body; the Authorization header is never included.
fn make_curl(method: &Method, url: &Url, headers: Option<&HeaderMap>, body: Option<&str>) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{method}")];
    for (name, val) in headers.into_iter().flat_map(|h| h.iter()) {
        if *name == AUTHORIZATION {
            continue;
        }
        let v = val.to_str().unwrap_or("");
        parts.push(format!("-H '{}: {}'", name.as_str(), v.replace('\'', r"'\''")));
    }
    if let Some(body) = body {
        parts.push(format!("-d '{}'", body.replace('\'', r"'\''")));
    }
    let (host_path, query) = redact_query(url);
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query)
        .finish();
    if query.is_empty() {
        parts.push(format!("'{}://{}'", url.scheme(), host_path));
    } else {
        parts.push(format!("'{}://{}?{}'", url.scheme(), host_path, query));
    }
    parts.join(" ")
}

/// Twitter: `{"errors":[{"message":"...","code":32}]}` or `{"error":"..."}`;
/// falls back to a body snippet.
fn extract_error_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct TwErrors {
        errors: Vec<TwErr>,
    }
    #[derive(Deserialize)]
    struct TwErr {
        #[serde(default)]
        message: String,
        #[serde(default)]
        code: Option<i64>,
    }
    #[derive(Deserialize)]
    struct Msg {
        error: String,
    }

    if let Ok(tw) = serde_json::from_slice::<TwErrors>(body) {
        if let Some(first) = tw.errors.into_iter().next() {
            return match first.code {
                Some(code) => format!("{} (code {code})", first.message),
                None => first.message,
            };
        }
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        return m.error;
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        let mut cut = 500;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}
