use chirp_http::HttpError;
use thiserror::Error;

/// Failure of a flow that should end in a [`Credential`](crate::Credential).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("xAuth token exchange failed: {0}")]
    XAuth(#[source] HttpError),
    #[error("request token call failed: {0}")]
    RequestToken(#[source] HttpError),
    #[error("access token exchange failed: {0}")]
    AccessToken(#[source] HttpError),
    #[error("token response is missing `{0}`")]
    MissingParameter(&'static str),
    #[error("invalid authorization URL: {0}")]
    Url(#[from] url::ParseError),
}
