//! Twitter REST v1.1 client for chirp.
//!
//! [`TwitterApi`] covers user lookup, friend and follower listings, user
//! timelines, tweet and user search, posting a status and fetching profile
//! images. Credentials come from configuration, from xAuth, or from the
//! three-legged OAuth flow in [`auth`]. Every request is signed with OAuth 1.0a
//! by `chirp-http`.
pub mod auth;
pub mod client;
pub mod credential;
pub mod date;
pub mod endpoint;
pub mod error;
pub mod types;

pub use auth::FormParams;
pub use chirp_http::HttpError;
pub use client::{ApiConfig, SearchQuery, TimelineQuery, TwitterApi};
pub use credential::Credential;
pub use date::DateParseError;
pub use error::AuthError;
pub use types::{Cursor, Tweet, TweetList, TweetSearchResults, User, UserList};
