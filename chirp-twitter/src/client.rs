//! Twitter REST v1.1 connector.
//!
//! Every call is one signed request against an [`Endpoint`](crate::endpoint::Endpoint);
//! responses are decoded into the entity types of [`crate::types`]. Out-of-range
//! page sizes are corrected to the API default instead of being rejected.
use bytes::Bytes;
use chirp_http::{Auth, HttpClient, HttpError, Params, RequestOpts, Signer};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::credential::Credential;
use crate::endpoint::{self, Endpoint};
use crate::types::{Cursor, Tweet, TweetList, TweetSearchResults, User, UserList};

pub const DEFAULT_API_BASE: &str = "https://api.twitter.com/";

/// Page size used whenever a requested count is out of range.
pub const DEFAULT_COUNT: i32 = 20;
pub const MAX_TIMELINE_COUNT: i32 = 200;
pub const MAX_SEARCH_COUNT: i32 = 100;
pub const MAX_USERS_PER_PAGE: i32 = 20;

/// Connection settings for [`TwitterApi`].
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub consumer_key: String,
    pub consumer_secret: SecretString,
    /// Default access token; calls are signed with the consumer alone without one.
    pub access_token: Option<String>,
    pub access_token_secret: Option<SecretString>,
    pub api_base: String,
}

impl ApiConfig {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: SecretString::new(consumer_secret.into()),
            access_token: None,
            access_token_secret: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_access_token(
        mut self,
        token: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        self.access_token = Some(token.into());
        self.access_token_secret = Some(SecretString::new(secret.into()));
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

/// Paging for `statuses/user_timeline`. Ids of zero are treated as unset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimelineQuery {
    pub count: i32,
    /// Only tweets older than this id; the id itself is excluded.
    pub max_id: Option<u64>,
    /// Only tweets newer than this id.
    pub since_id: Option<u64>,
}

impl Default for TimelineQuery {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            max_id: None,
            since_id: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    pub count: i32,
    pub since_id: Option<u64>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            since_id: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TwitterApi {
    pub(crate) http: HttpClient,
    pub(crate) consumer: Signer,
    pub(crate) credential: Option<Credential>,
}

impl TwitterApi {
    pub fn new(config: ApiConfig) -> Result<Self, HttpError> {
        let http = HttpClient::new(&config.api_base)?;
        Ok(Self::from_parts(http, config))
    }

    /// Use a caller-configured `reqwest::Client` (timeouts, proxies, pooling).
    pub fn with_http_client(client: reqwest::Client, config: ApiConfig) -> Result<Self, HttpError> {
        let http = HttpClient::with_client(client, &config.api_base)?;
        Ok(Self::from_parts(http, config))
    }

    fn from_parts(http: HttpClient, config: ApiConfig) -> Self {
        let consumer = Signer::new(
            config.consumer_key,
            config.consumer_secret.expose_secret().clone(),
        );
        let credential = match (config.access_token, config.access_token_secret) {
            (Some(token), Some(secret)) => Some(Credential::new(
                consumer
                    .clone()
                    .with_token(token, secret.expose_secret().clone()),
                None,
            )),
            _ => None,
        };
        Self {
            http,
            consumer,
            credential,
        }
    }

    /// A connector sharing this one's HTTP client that signs as `credential`.
    pub fn with_credential(&self, credential: Credential) -> Self {
        Self {
            http: self.http.clone(),
            consumer: self.consumer.clone(),
            credential: Some(credential),
        }
    }

    /// The credential calls are signed with, if any.
    pub fn default_credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    fn signer(&self) -> &Signer {
        self.credential
            .as_ref()
            .map(Credential::signer)
            .unwrap_or(&self.consumer)
    }

    pub async fn get_user(&self, screen_name: &str) -> Result<User, HttpError> {
        self.call(&endpoint::USERS_SHOW, vec![("screen_name", screen_name.into())])
            .await
    }

    /// One page of the accounts `screen_name` follows. `None` starts at [`Cursor::BEGIN`].
    pub async fn get_friends(
        &self,
        screen_name: &str,
        cursor: Option<Cursor>,
    ) -> Result<UserList, HttpError> {
        self.call(&endpoint::FRIENDS_LIST, cursor_params(screen_name, cursor))
            .await
    }

    pub async fn get_followers(
        &self,
        screen_name: &str,
        cursor: Option<Cursor>,
    ) -> Result<UserList, HttpError> {
        self.call(&endpoint::FOLLOWERS_LIST, cursor_params(screen_name, cursor))
            .await
    }

    pub async fn get_tweets(&self, screen_name: &str) -> Result<TweetList, HttpError> {
        self.get_tweets_with(screen_name, TimelineQuery::default())
            .await
    }

    pub async fn get_tweets_with(
        &self,
        screen_name: &str,
        query: TimelineQuery,
    ) -> Result<TweetList, HttpError> {
        self.call(
            &endpoint::STATUSES_USER_TIMELINE,
            timeline_params(screen_name, query),
        )
        .await
    }

    pub async fn search_tweets(&self, query: &str) -> Result<TweetSearchResults, HttpError> {
        self.search_tweets_with(query, SearchQuery::default()).await
    }

    pub async fn search_tweets_with(
        &self,
        query: &str,
        options: SearchQuery,
    ) -> Result<TweetSearchResults, HttpError> {
        self.call(&endpoint::SEARCH_TWEETS, search_params(query, options))
            .await
    }

    pub async fn search_users(&self, query: &str) -> Result<Vec<User>, HttpError> {
        self.search_users_with(query, DEFAULT_COUNT).await
    }

    pub async fn search_users_with(
        &self,
        query: &str,
        per_page: i32,
    ) -> Result<Vec<User>, HttpError> {
        let per_page = clamp(per_page, MAX_USERS_PER_PAGE);
        self.call(
            &endpoint::USERS_SEARCH,
            vec![("q", query.into()), ("per_page", per_page.to_string().into())],
        )
        .await
    }

    /// Post `text` as the signing account.
    pub async fn update_status(&self, text: &str) -> Result<Tweet, HttpError> {
        self.call(&endpoint::STATUSES_UPDATE, vec![("status", text.into())])
            .await
    }

    /// Download an avatar from the absolute `url` found on a [`User`]. Unsigned.
    pub async fn get_profile_image(&self, url: &str) -> Result<Bytes, HttpError> {
        tracing::debug!(%url, "twitter.profile_image");
        self.http
            .get_bytes(
                url,
                RequestOpts {
                    allow_absolute: true,
                    ..Default::default()
                },
            )
            .await
    }

    async fn call<T>(&self, endpoint: &Endpoint, params: Params<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        tracing::debug!(endpoint = endpoint.name, path = endpoint.path, "twitter.call");
        let (query, form) = if endpoint.method == Method::GET {
            (Some(params), None)
        } else {
            (None, Some(params))
        };
        self.http
            .request_json(
                endpoint.method.clone(),
                endpoint.path,
                RequestOpts {
                    auth: Some(Auth::oauth1(self.signer())),
                    query,
                    form,
                    expect_status: Some(endpoint.expect),
                    ..Default::default()
                },
            )
            .await
    }
}

/// `requested` if it lies in `1..=max`, otherwise [`DEFAULT_COUNT`].
pub(crate) fn clamp(requested: i32, max: i32) -> i32 {
    if (1..=max).contains(&requested) {
        requested
    } else {
        DEFAULT_COUNT
    }
}

fn cursor_params(screen_name: &str, cursor: Option<Cursor>) -> Params<'_> {
    let cursor = cursor.unwrap_or(Cursor::BEGIN);
    vec![
        ("screen_name", screen_name.into()),
        ("cursor", cursor.to_string().into()),
    ]
}

fn timeline_params(screen_name: &str, query: TimelineQuery) -> Params<'_> {
    let mut params: Params<'_> = vec![
        ("screen_name", screen_name.into()),
        (
            "count",
            clamp(query.count, MAX_TIMELINE_COUNT).to_string().into(),
        ),
    ];
    // The API's max_id is inclusive.
    if let Some(max_id) = query.max_id.filter(|id| *id > 0) {
        params.push(("max_id", (max_id - 1).to_string().into()));
    }
    if let Some(since_id) = query.since_id.filter(|id| *id > 0) {
        params.push(("since_id", since_id.to_string().into()));
    }
    params
}

fn search_params(query: &str, options: SearchQuery) -> Params<'_> {
    let mut params: Params<'_> = vec![
        ("q", query.into()),
        (
            "count",
            clamp(options.count, MAX_SEARCH_COUNT).to_string().into(),
        ),
    ];
    if let Some(since_id) = options.since_id.filter(|id| *id > 0) {
        params.push(("since_id", since_id.to_string().into()));
    }
    params
}
