//! OAuth 1.0a request signing (HMAC-SHA1).
//!
//! A [`Signer`] holds the consumer key pair and, once one has been issued, an
//! access [`Token`]. [`Signer::authorization`] turns a request (method, URL
//! with its query string, form body parameters) into the value of the
//! `Authorization` header that Twitter expects.
//!
//! ```
//! use chirp_http::oauth::Signer;
//! use reqwest::{Method, Url};
//!
//! let signer = Signer::new("consumer", "consumer-secret").with_token("token", "token-secret");
//! let url = Url::parse("https://api.twitter.com/1.1/users/show.json?screen_name=jack").unwrap();
//! let header = signer.authorization(&Method::GET, &url, &[], &[]);
//!
//! assert!(header.starts_with("OAuth "));
//! assert!(header.contains(r#"oauth_token="token""#));
//! ```

use std::borrow::Cow;

use data_encoding::BASE64;
use hmac::{Hmac, Mac};
use reqwest::{Method, Url};
use secrecy::{ExposeSecret, SecretString};
use sha1::Sha1;
use time::OffsetDateTime;
use uuid::Uuid;

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

/// An access token (or temporary request token) and its secret.
#[derive(Clone, Debug)]
pub struct Token {
    pub key: String,
    pub secret: SecretString,
}

impl Token {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: SecretString::new(secret.into()),
        }
    }
}

/// Consumer key pair plus an optional access token.
#[derive(Clone, Debug)]
pub struct Signer {
    consumer_key: String,
    consumer_secret: SecretString,
    token: Option<Token>,
}

impl Signer {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: SecretString::new(consumer_secret.into()),
            token: None,
        }
    }

    pub fn with_token(mut self, key: impl Into<String>, secret: impl Into<String>) -> Self {
        self.token = Some(Token::new(key, secret));
        self
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Build the `Authorization` header value for a request.
    ///
    /// `form` holds the `application/x-www-form-urlencoded` body parameters
    /// (empty for GET); the URL's query string is read from `url`. `extras`
    /// are additional protocol parameters such as `oauth_callback` or
    /// `oauth_verifier`; they are signed and sent in the header.
    pub fn authorization(
        &self,
        method: &Method,
        url: &Url,
        form: &[(&str, Cow<'_, str>)],
        extras: &[(&str, Cow<'_, str>)],
    ) -> String {
        let nonce = Uuid::new_v4().simple().to_string();
        let timestamp = OffsetDateTime::now_utc().unix_timestamp();
        self.authorization_with(&nonce, timestamp, method, url, form, extras)
    }

    /// Same as [`Signer::authorization`] with a caller-chosen nonce and timestamp.
    pub fn authorization_with(
        &self,
        nonce: &str,
        timestamp: i64,
        method: &Method,
        url: &Url,
        form: &[(&str, Cow<'_, str>)],
        extras: &[(&str, Cow<'_, str>)],
    ) -> String {
        let mut protocol = self.protocol_params(nonce, timestamp, extras);

        let mut signed: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        signed.extend(form.iter().map(|(k, v)| ((*k).to_string(), v.to_string())));
        signed.extend(protocol.iter().cloned());

        let base = signature_base_string(method, url, &signed);
        let signature = self.sign(&base);
        protocol.push(("oauth_signature".to_string(), signature));
        protocol.sort();

        let fields: Vec<String> = protocol
            .iter()
            .map(|(k, v)| format!(r#"{}="{}""#, percent_encode(k), percent_encode(v)))
            .collect();
        format!("OAuth {}", fields.join(", "))
    }

    fn protocol_params(
        &self,
        nonce: &str,
        timestamp: i64,
        extras: &[(&str, Cow<'_, str>)],
    ) -> Vec<(String, String)> {
        let mut params = vec![
            ("oauth_consumer_key".to_string(), self.consumer_key.clone()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            (
                "oauth_signature_method".to_string(),
                SIGNATURE_METHOD.to_string(),
            ),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_version".to_string(), OAUTH_VERSION.to_string()),
        ];
        // An explicit oauth_token extra (verifier exchange) replaces the held token.
        let explicit_token = extras.iter().any(|(k, _)| *k == "oauth_token");
        if let (Some(token), false) = (&self.token, explicit_token) {
            params.push(("oauth_token".to_string(), token.key.clone()));
        }
        params.extend(extras.iter().map(|(k, v)| ((*k).to_string(), v.to_string())));
        params
    }

    fn sign(&self, base: &str) -> String {
        let token_secret = self
            .token
            .as_ref()
            .map(|t| t.secret.expose_secret().as_str())
            .unwrap_or("");
        let key = format!(
            "{}&{}",
            percent_encode(self.consumer_secret.expose_secret()),
            percent_encode(token_secret)
        );
        let mut mac =
            Hmac::<Sha1>::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
        mac.update(base.as_bytes());
        BASE64.encode(&mac.finalize().into_bytes())
    }
}

/// RFC 3986 percent-encoding: everything but `A-Z a-z 0-9 - . _ ~` is escaped.
pub fn percent_encode(raw: &str) -> Cow<'_, str> {
    urlencoding::encode(raw)
}

/// `METHOD&enc(base_url)&enc(normalized_params)`.
pub fn signature_base_string(method: &Method, url: &Url, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(Cow<'_, str>, Cow<'_, str>)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();
    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.as_str().to_ascii_uppercase(),
        percent_encode(&base_url(url)),
        percent_encode(&normalized)
    )
}

/// The request URL without query or fragment. `Url` already lowercases the
/// scheme and host and drops default ports.
fn base_url(url: &Url) -> String {
    let mut base = url.clone();
    base.set_query(None);
    base.set_fragment(None);
    base.to_string()
}
