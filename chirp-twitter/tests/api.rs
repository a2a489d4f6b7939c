mod common;

use chirp_twitter::{Cursor, HttpError, SearchQuery, TimelineQuery};
use reqwest::StatusCode;
use serde_json::json;
use time::macros::datetime;
use wiremock::matchers::{body_string, header_exists, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tweet_json(id: &str, created_at: &str, text: &str) -> serde_json::Value {
    json!({
        "id": id.parse::<u64>().unwrap(),
        "id_str": id,
        "created_at": created_at,
        "text": text,
        "retweet_count": 0
    })
}

fn user_json(screen_name: &str) -> serde_json::Value {
    json!({
        "id": 1,
        "screen_name": screen_name,
        "name": "Mark Kolich",
        "created_at": "Mon Feb 02 01:46:45 +0000 2009",
        "profile_image_url": "http://a0.twimg.com/profile_images/1/me_normal.png"
    })
}

#[tokio::test]
async fn user_timeline_decodes_tweets() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .and(query_param("screen_name", "markkolich"))
        .and(query_param("count", "20"))
        .and(header_regex("authorization", r#"oauth_token="t""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            tweet_json("14000000000000002", "Thu May 13 14:24:37 +0000 2010", "second"),
            tweet_json("14000000000000001", "Wed May 12 22:32:30 +0000 2010", "first"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let api = common::user_api(&server);
    let tweets = api.get_tweets("markkolich").await.unwrap();

    assert_eq!(tweets.len(), 2);
    assert_eq!(tweets.tweets()[0].id, "14000000000000002");
    assert_eq!(tweets.tweets()[0].text, "second");
    assert_eq!(tweets.tweets()[1].id, "14000000000000001");
    assert_eq!(tweets.tweets()[1].text, "first");
}

#[tokio::test]
async fn unauthorized_timeline_is_an_error() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            r#"{"errors":[{"message":"Could not authenticate you.","code":32}]}"#,
        ))
        .mount(&server)
        .await;

    let api = common::user_api(&server);
    let err = api.get_tweets("markkolich").await.unwrap_err();
    assert!(matches!(err, HttpError::Status { .. }), "{err:?}");
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn timeline_paging_parameters_are_sent() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .and(query_param("count", "150"))
        .and(query_param("max_id", "41"))
        .and(query_param("since_id", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = common::user_api(&server);
    let tweets = api
        .get_tweets_with(
            "markkolich",
            TimelineQuery {
                count: 150,
                max_id: Some(42),
                since_id: Some(10),
            },
        )
        .await
        .unwrap();
    assert!(tweets.is_empty());
}

#[tokio::test]
async fn friends_start_at_the_first_cursor() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/friends/list.json"))
        .and(query_param("screen_name", "markkolich"))
        .and(query_param("cursor", "-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [user_json("jack"), user_json("biz")],
            "next_cursor": 1374004777531007833i64,
            "previous_cursor": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = common::user_api(&server);
    let page = api.get_friends("markkolich", None).await.unwrap();
    assert_eq!(page.users.len(), 2);
    assert_eq!(page.users[0].screen_name, "jack");
    assert!(page.has_next());
    assert_eq!(page.next_cursor, Cursor(1374004777531007833));
}

#[tokio::test]
async fn followers_follow_the_given_cursor() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/followers/list.json"))
        .and(query_param("cursor", "1374004777531007833"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [user_json("MarkKolich")],
            "next_cursor": 0,
            "previous_cursor": -1374004777531007833i64
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = common::user_api(&server);
    let page = api
        .get_followers("markkolich", Some(Cursor(1374004777531007833)))
        .await
        .unwrap();
    assert!(!page.has_next());
    assert_eq!(page.users[0], api_user("markkolich"));
}

fn api_user(screen_name: &str) -> chirp_twitter::User {
    serde_json::from_value(user_json(screen_name)).unwrap()
}

#[tokio::test]
async fn user_lookup_by_screen_name() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/users/show.json"))
        .and(query_param("screen_name", "markkolich"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("markkolich")))
        .mount(&server)
        .await;

    let api = common::user_api(&server);
    let user = api.get_user("markkolich").await.unwrap();
    assert_eq!(user.name, "Mark Kolich");
    assert_eq!(user.created_at, datetime!(2009-02-02 01:46:45 UTC));
}

#[tokio::test]
async fn search_clamps_count_and_sends_since_id() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/search/tweets.json"))
        .and(query_param("q", "#rust lang"))
        .and(query_param("count", "20"))
        .and(query_param("since_id", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statuses": [tweet_json("6", "Mon, 21 Jun 2010 18:56:18 +0000", "found")],
            "search_metadata": {"count": 20}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = common::user_api(&server);
    let results = api
        .search_tweets_with(
            "#rust lang",
            SearchQuery {
                count: 101,
                since_id: Some(5),
            },
        )
        .await
        .unwrap();
    assert_eq!(results.statuses.len(), 1);
    assert_eq!(results.statuses[0].text, "found");
}

#[tokio::test]
async fn user_search_sends_per_page() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/users/search.json"))
        .and(query_param("q", "mark"))
        .and(query_param("per_page", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([user_json("markkolich")])))
        .expect(1)
        .mount(&server)
        .await;

    let api = common::user_api(&server);
    let users = api.search_users_with("mark", 5).await.unwrap();
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn status_update_posts_a_signed_form() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1.1/statuses/update.json"))
        .and(header_exists("authorization"))
        .and(body_string("status=Hello+Ladies+%2B+Gentlemen"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tweet_json(
            "99",
            "Thu May 13 14:24:37 +0000 2010",
            "Hello Ladies + Gentlemen",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let api = common::user_api(&server);
    let tweet = api.update_status("Hello Ladies + Gentlemen").await.unwrap();
    assert_eq!(tweet.id, "99");
}

#[tokio::test]
async fn profile_images_are_fetched_unsigned() {
    common::init_test_tracing();
    let images = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile_images/1/me_normal.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']))
        .expect(1)
        .mount(&images)
        .await;

    let api_server = MockServer::start().await;
    let api = common::user_api(&api_server);
    let bytes = api
        .get_profile_image(&format!("{}/profile_images/1/me_normal.png", images.uri()))
        .await
        .unwrap();
    assert_eq!(&bytes[..], &[0x89, b'P', b'N', b'G']);

    let requests = images.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}
