//! REST resources used by [`TwitterApi`](crate::TwitterApi), relative to the API base.

use reqwest::{Method, StatusCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub method: Method,
    pub path: &'static str,
    pub expect: StatusCode,
}

const fn get(name: &'static str, path: &'static str) -> Endpoint {
    Endpoint {
        name,
        method: Method::GET,
        path,
        expect: StatusCode::OK,
    }
}

const fn post(name: &'static str, path: &'static str) -> Endpoint {
    Endpoint {
        name,
        method: Method::POST,
        path,
        expect: StatusCode::OK,
    }
}

pub const USERS_SHOW: Endpoint = get("users.show", "1.1/users/show.json");
pub const FRIENDS_LIST: Endpoint = get("friends.list", "1.1/friends/list.json");
pub const FOLLOWERS_LIST: Endpoint = get("followers.list", "1.1/followers/list.json");
pub const STATUSES_USER_TIMELINE: Endpoint =
    get("statuses.user_timeline", "1.1/statuses/user_timeline.json");
pub const SEARCH_TWEETS: Endpoint = get("search.tweets", "1.1/search/tweets.json");
pub const USERS_SEARCH: Endpoint = get("users.search", "1.1/users/search.json");
pub const STATUSES_UPDATE: Endpoint = post("statuses.update", "1.1/statuses/update.json");

pub const OAUTH_REQUEST_TOKEN: Endpoint = post("oauth.request_token", "oauth/request_token");
pub const OAUTH_ACCESS_TOKEN: Endpoint = post("oauth.access_token", "oauth/access_token");
/// Browser redirect target; never requested by the client.
pub const OAUTH_AUTHENTICATE: Endpoint = get("oauth.authenticate", "oauth/authenticate");
