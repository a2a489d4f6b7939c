//! Credential acquisition: xAuth and the three-legged OAuth dance.
//!
//! Token endpoints answer with `application/x-www-form-urlencoded` bodies such as
//! `oauth_token=...&oauth_token_secret=...&screen_name=...`, decoded into
//! [`FormParams`].
use std::fmt;

use chirp_http::{Auth, HttpError, Params, RequestOpts};
use url::Url;

use crate::client::TwitterApi;
use crate::credential::Credential;
use crate::endpoint::{self, Endpoint};
use crate::error::AuthError;

const REDACTED: &[&str] = &["oauth_token_secret"];

/// Decoded name/value pairs of a token endpoint response.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FormParams {
    pairs: Vec<(String, String)>,
}

impl FormParams {
    pub fn parse(body: &str) -> Self {
        let pairs = url::form_urlencoded::parse(body.trim().as_bytes())
            .into_owned()
            .collect();
        Self { pairs }
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`FormParams::get`], but absent or empty values are an error.
    pub fn require(&self, name: &'static str) -> Result<&str, AuthError> {
        self.get(name)
            .filter(|v| !v.is_empty())
            .ok_or(AuthError::MissingParameter(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Debug for FormParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(k, v)| {
                if REDACTED.contains(&k) {
                    (k, "<redacted>")
                } else {
                    (k, v)
                }
            }))
            .finish()
    }
}

impl TwitterApi {
    /// Exchange a username and password for an access token (xAuth).
    pub async fn xauth_access_token(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Credential, AuthError> {
        let form: Params<'_> = vec![
            ("x_auth_mode", "client_auth".into()),
            ("x_auth_username", username.into()),
            ("x_auth_password", password.into()),
        ];
        let params = self
            .token_exchange(&endpoint::OAUTH_ACCESS_TOKEN, Some(form), Vec::new())
            .await
            .map_err(AuthError::XAuth)?;
        let credential = self.credential_from(&params)?;
        tracing::info!(username, "twitter.oauth.xauth");
        Ok(credential)
    }

    /// Obtain a temporary request token that redirects to `callback_url` once
    /// the user has authorized it.
    pub async fn request_token(&self, callback_url: &str) -> Result<FormParams, HttpError> {
        self.token_exchange(
            &endpoint::OAUTH_REQUEST_TOKEN,
            None,
            vec![("oauth_callback", callback_url.into())],
        )
        .await
    }

    /// Where to send the user to authorize this application.
    pub async fn authorize_url(&self, callback_url: &str) -> Result<Url, AuthError> {
        let params = self
            .request_token(callback_url)
            .await
            .map_err(AuthError::RequestToken)?;
        let token = params.require("oauth_token")?;
        let mut url = self.http.base().join(endpoint::OAUTH_AUTHENTICATE.path)?;
        url.query_pairs_mut().append_pair("oauth_token", token);
        tracing::info!(%url, "twitter.oauth.authorize_url");
        Ok(url)
    }

    /// Trade an authorized request token and its verifier for an access token.
    pub async fn access_token(&self, token: &str, verifier: &str) -> Result<Credential, AuthError> {
        let params = self
            .access_token_params(token, verifier)
            .await
            .map_err(AuthError::AccessToken)?;
        let credential = self.credential_from(&params)?;
        tracing::info!(
            screen_name = credential.username().unwrap_or("-"),
            "twitter.oauth.access_token"
        );
        Ok(credential)
    }

    pub async fn access_token_params(
        &self,
        token: &str,
        verifier: &str,
    ) -> Result<FormParams, HttpError> {
        self.token_exchange(
            &endpoint::OAUTH_ACCESS_TOKEN,
            None,
            vec![("oauth_token", token.into()), ("oauth_verifier", verifier.into())],
        )
        .await
    }

    /// A credential for a token pair obtained elsewhere, bound to this
    /// connector's consumer.
    pub fn credential(
        &self,
        token: impl Into<String>,
        secret: impl Into<String>,
        username: Option<&str>,
    ) -> Credential {
        Credential::new(
            self.consumer.clone().with_token(token, secret),
            username.map(str::to_string),
        )
    }

    fn credential_from(&self, params: &FormParams) -> Result<Credential, AuthError> {
        let token = params.require("oauth_token")?;
        let secret = params.require("oauth_token_secret")?;
        Ok(self.credential(token, secret, params.get("screen_name")))
    }

    /// Token endpoints are signed with the consumer key pair only.
    async fn token_exchange(
        &self,
        endpoint: &Endpoint,
        form: Option<Params<'_>>,
        extras: Params<'_>,
    ) -> Result<FormParams, HttpError> {
        tracing::debug!(endpoint = endpoint.name, "twitter.oauth.exchange");
        let body = self
            .http
            .request_text(
                endpoint.method.clone(),
                endpoint.path,
                RequestOpts {
                    auth: Some(Auth::OAuth1 {
                        signer: &self.consumer,
                        extras,
                    }),
                    form,
                    expect_status: Some(endpoint.expect),
                    ..Default::default()
                },
            )
            .await?;
        Ok(FormParams::parse(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_token_responses() {
        let params = FormParams::parse(
            "oauth_token=abc&oauth_token_secret=s%2Fecret&screen_name=markkolich\n",
        );
        assert_eq!(params.get("oauth_token"), Some("abc"));
        assert_eq!(params.get("oauth_token_secret"), Some("s/ecret"));
        assert_eq!(params.require("screen_name").unwrap(), "markkolich");
        assert_eq!(params.get("user_id"), None);
    }

    #[test]
    fn empty_values_count_as_missing() {
        let params = FormParams::parse("oauth_token=abc&oauth_token_secret=");
        assert!(matches!(
            params.require("oauth_token_secret"),
            Err(AuthError::MissingParameter("oauth_token_secret"))
        ));
        assert!(FormParams::parse("").is_empty());
    }

    #[test]
    fn debug_output_hides_the_token_secret() {
        let params = FormParams::parse("oauth_token=abc&oauth_token_secret=hunter2");
        let rendered = format!("{params:?}");
        assert!(rendered.contains("abc"));
        assert!(!rendered.contains("hunter2"));
    }
}
