mod common;

use chirp_twitter::{AuthError, HttpError};
use reqwest::StatusCode;
use wiremock::matchers::{body_string, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn xauth_yields_a_credential() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .and(body_string(
            "x_auth_mode=client_auth&x_auth_username=markkolich&x_auth_password=hunter2",
        ))
        .and(header_regex("authorization", r#"oauth_consumer_key="ck""#))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "oauth_token=123-abc&oauth_token_secret=s3cret&user_id=123&screen_name=markkolich",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let api = common::consumer_api(&server);
    let credential = api.xauth_access_token("markkolich", "hunter2").await.unwrap();
    assert_eq!(credential.token(), Some("123-abc"));
    assert_eq!(credential.expose_token_secret(), Some("s3cret"));
    assert_eq!(credential.username(), Some("markkolich"));

    let requests = server.received_requests().await.unwrap();
    let header = requests[0].headers.get("authorization").unwrap().to_str().unwrap();
    assert!(!header.contains("oauth_token="), "{header}");
}

#[tokio::test]
async fn xauth_without_secret_is_rejected() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("oauth_token=123-abc"))
        .mount(&server)
        .await;

    let api = common::consumer_api(&server);
    let err = api.xauth_access_token("markkolich", "hunter2").await.unwrap_err();
    assert!(
        matches!(err, AuthError::MissingParameter("oauth_token_secret")),
        "{err:?}"
    );
}

#[tokio::test]
async fn xauth_failure_wraps_the_http_error() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid user name or password"))
        .mount(&server)
        .await;

    let api = common::consumer_api(&server);
    match api.xauth_access_token("markkolich", "wrong").await {
        Err(AuthError::XAuth(HttpError::Status { status, message, .. })) => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(message, "Invalid user name or password");
        }
        other => panic!("expected xAuth status error, got {other:?}"),
    }
}

#[tokio::test]
async fn authorize_url_carries_the_request_token() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .and(header_regex(
            "authorization",
            r#"oauth_callback="http%3A%2F%2Flocalhost%3A8080%2Fcallback""#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "oauth_token=req-token&oauth_token_secret=req-secret&oauth_callback_confirmed=true",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let api = common::consumer_api(&server);
    let url = api
        .authorize_url("http://localhost:8080/callback")
        .await
        .unwrap();
    assert_eq!(url.path(), "/oauth/authenticate");
    assert_eq!(url.query(), Some("oauth_token=req-token"));
}

#[tokio::test]
async fn request_token_failure_is_reported() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let api = common::consumer_api(&server);
    let err = api.authorize_url("oob").await.unwrap_err();
    assert!(matches!(err, AuthError::RequestToken(_)), "{err:?}");
}

#[tokio::test]
async fn verifier_exchange_binds_the_screen_name() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .and(header_regex("authorization", r#"oauth_token="req-token""#))
        .and(header_regex("authorization", r#"oauth_verifier="v-123""#))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "oauth_token=acc-token&oauth_token_secret=acc-secret&screen_name=markkolich",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let api = common::consumer_api(&server);
    let credential = api.access_token("req-token", "v-123").await.unwrap();
    assert_eq!(credential.token(), Some("acc-token"));
    assert_eq!(credential.username(), Some("markkolich"));

    let user_api = api.with_credential(credential);
    assert_eq!(
        user_api.default_credential().and_then(|c| c.token()),
        Some("acc-token")
    );
}

#[tokio::test]
async fn verifier_exchange_params_are_exposed() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "oauth_token=acc-token&oauth_token_secret=acc-secret&user_id=42",
        ))
        .mount(&server)
        .await;

    let api = common::consumer_api(&server);
    let params = api.access_token_params("req-token", "v-123").await.unwrap();
    assert_eq!(params.get("user_id"), Some("42"));

    let credential = api.access_token("req-token", "v-123").await.unwrap();
    assert_eq!(credential.username(), None);
}

#[tokio::test]
async fn stored_tokens_build_credentials() {
    let server = MockServer::start().await;
    let api = common::consumer_api(&server);
    let credential = api.credential("t", "ts", Some("markkolich"));
    assert_eq!(credential.signer().consumer_key(), "ck");
    assert_eq!(credential.expose_token_secret(), Some("ts"));
    assert_eq!(credential.to_string(), "token=t username=markkolich");
}
