use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A Twitter account. Identity is the screen name, compared case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub screen_name: String,
    pub name: String,
    #[serde(with = "crate::date")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub profile_image_url: String,
}

impl User {
    fn folded(&self) -> impl Iterator<Item = char> + '_ {
        self.screen_name.chars().flat_map(char::to_lowercase)
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.folded().eq(other.folded())
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for c in self.folded() {
            c.hash(state);
        }
    }
}

impl PartialOrd for User {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for User {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded().cmp(other.folded())
    }
}

/// A status. Identity is the string id; the natural order puts the most
/// recent tweet first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawTweet")]
pub struct Tweet {
    #[serde(rename = "id_str")]
    pub id: String,
    #[serde(with = "crate::date")]
    pub created_at: OffsetDateTime,
    pub text: String,
}

impl PartialEq for Tweet {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Tweet {}

impl Hash for Tweet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Tweet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tweet {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .created_at
            .cmp(&self.created_at)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Wire shape of a status. `id_str` is authoritative; the numeric `id` is used
/// only when a payload omits it.
#[derive(Deserialize)]
struct RawTweet {
    #[serde(default)]
    id_str: Option<String>,
    #[serde(default)]
    id: Option<u64>,
    #[serde(with = "crate::date")]
    created_at: OffsetDateTime,
    #[serde(alias = "full_text")]
    text: String,
}

impl TryFrom<RawTweet> for Tweet {
    type Error = String;

    fn try_from(raw: RawTweet) -> Result<Self, Self::Error> {
        let id = match (raw.id_str, raw.id) {
            (Some(id), _) => id,
            (None, Some(id)) => id.to_string(),
            (None, None) => return Err("tweet has neither `id_str` nor `id`".to_string()),
        };
        Ok(Tweet {
            id,
            created_at: raw.created_at,
            text: raw.text,
        })
    }
}

/// Pagination token for friends/followers listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(pub i64);

impl Cursor {
    /// Start from the first page.
    pub const BEGIN: Cursor = Cursor(-1);
    /// Returned as `next_cursor` on the last page.
    pub const END: Cursor = Cursor(0);

    pub fn is_end(self) -> bool {
        self == Cursor::END
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn end_cursor() -> Cursor {
    Cursor::END
}

/// One page of `friends/list` or `followers/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default = "end_cursor")]
    pub next_cursor: Cursor,
    #[serde(default = "end_cursor")]
    pub previous_cursor: Cursor,
}

impl UserList {
    pub fn has_next(&self) -> bool {
        !self.next_cursor.is_end()
    }
}

/// A user timeline, in the order the API returned it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TweetList {
    tweets: Vec<Tweet>,
}

impl TweetList {
    pub fn new(tweets: Vec<Tweet>) -> Self {
        Self { tweets }
    }

    pub fn tweets(&self) -> &[Tweet] {
        &self.tweets
    }

    pub fn len(&self) -> usize {
        self.tweets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tweet> {
        self.tweets.iter()
    }

    pub fn into_vec(self) -> Vec<Tweet> {
        self.tweets
    }
}

impl From<Vec<Tweet>> for TweetList {
    fn from(tweets: Vec<Tweet>) -> Self {
        Self::new(tweets)
    }
}

impl IntoIterator for TweetList {
    type Item = Tweet;
    type IntoIter = std::vec::IntoIter<Tweet>;

    fn into_iter(self) -> Self::IntoIter {
        self.tweets.into_iter()
    }
}

impl<'a> IntoIterator for &'a TweetList {
    type Item = &'a Tweet;
    type IntoIter = std::slice::Iter<'a, Tweet>;

    fn into_iter(self) -> Self::IntoIter {
        self.tweets.iter()
    }
}

/// Matches from `search/tweets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetSearchResults {
    #[serde(default)]
    pub statuses: Vec<Tweet>,
}
