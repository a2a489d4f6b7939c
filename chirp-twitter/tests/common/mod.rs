#![allow(dead_code)]

use std::sync::OnceLock;

use chirp_common::observability::{LogConfig, LogFormat};
use wiremock::MockServer;

use chirp_twitter::{ApiConfig, TwitterApi};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "chirp-tests",
            log_dir: Some(std::env::temp_dir().join("chirp-tests")),
            emit_stderr: true,
            format: if std::env::var("CHIRP_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".into(),
        };

        chirp_common::observability::init_logging(config).unwrap_or_default()
    });
}

/// Consumer keys only.
pub fn consumer_api(server: &MockServer) -> TwitterApi {
    TwitterApi::new(ApiConfig::new("ck", "cs").with_api_base(format!("{}/", server.uri())))
        .expect("mock server uri is a valid base")
}

/// Consumer keys plus an access token for `markkolich`.
pub fn user_api(server: &MockServer) -> TwitterApi {
    TwitterApi::new(
        ApiConfig::new("ck", "cs")
            .with_access_token("t", "ts")
            .with_api_base(format!("{}/", server.uri())),
    )
    .expect("mock server uri is a valid base")
}
