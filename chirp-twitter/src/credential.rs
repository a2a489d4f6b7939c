use std::fmt;

use chirp_http::Signer;
use secrecy::ExposeSecret;

/// A user's access token bound to the consumer it was issued for.
#[derive(Clone)]
pub struct Credential {
    signer: Signer,
    username: Option<String>,
}

impl Credential {
    /// `signer` must carry an access token.
    pub fn new(signer: Signer, username: Option<String>) -> Self {
        Self { signer, username }
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.signer.token().map(|t| t.key.as_str())
    }

    /// The token secret in clear text, for persisting a credential.
    pub fn expose_token_secret(&self) -> Option<&str> {
        self.signer
            .token()
            .map(|t| t.secret.expose_secret().as_str())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("consumer_key", &self.signer.consumer_key())
            .field("token", &self.token())
            .field("token_secret", &"<redacted>")
            .field("username", &self.username)
            .finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "token={} username={}",
            self.token().unwrap_or("-"),
            self.username().unwrap_or("-")
        )
    }
}
