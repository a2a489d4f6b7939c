//! Loader for `chirp.yaml` with environment overlays.
//!
//! Sources merge in the order they were added; `CHIRP__`-prefixed variables
//! (`CHIRP__TWITTER__CONSUMER_KEY` sets `twitter.consumer_key`) are applied
//! last. String values may reference the environment as `${VAR}` or `$VAR`,
//! expanded recursively after merging.
//!
//! ```yaml
//! version: "1"
//! twitter:
//!   consumer_key: "abc"
//!   consumer_secret: "${TWITTER_CONSUMER_SECRET}"
//!   access_token: "123-def"          # optional
//!   access_token_secret: "..."       # optional
//!   api_base: "https://api.twitter.com/"
//! logging:
//!   filter: "info,chirp_http=debug"
//!   format: json
//!   emit_stderr: true
//!   dir: "~/.local/share/chirp"
//! ```
use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub use config::ConfigError;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "CHIRP";
const ENV_SEPARATOR: &str = "__";

pub const DEFAULT_API_BASE: &str = "https://api.twitter.com/";

#[derive(Debug, Deserialize)]
pub struct ChirpConfig {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub version: Option<String>,
    pub twitter: TwitterSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize)]
pub struct TwitterSettings {
    #[serde(deserialize_with = "lenient::string")]
    pub consumer_key: String,
    pub consumer_secret: SecretString,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub access_token_secret: Option<SecretString>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default, deserialize_with = "lenient::bool")]
    pub emit_stderr: bool,
    /// `~` is expanded by the logging initialiser.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: LogFormat::default(),
            emit_stderr: false,
            dir: None,
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.into()
}

fn default_filter() -> String {
    "info".into()
}

/// `<config dir>/chirp/chirp.yaml`, e.g. `~/.config/chirp/chirp.yaml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chirp").join("chirp.yaml"))
}

/// Environment variables arrive as strings; these accept either shape.
mod lenient {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Bool(bool),
        Int(i64),
        Float(f64),
        Str(String),
    }

    impl Scalar {
        fn into_string(self) -> String {
            match self {
                Scalar::Bool(b) => b.to_string(),
                Scalar::Int(i) => i.to_string(),
                Scalar::Float(f) => f.to_string(),
                Scalar::Str(s) => s,
            }
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Scalar::deserialize(d).map(Scalar::into_string)
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Option::<Scalar>::deserialize(d).map(|s| s.map(Scalar::into_string))
    }

    pub fn bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        match Scalar::deserialize(d)? {
            Scalar::Bool(b) => Ok(b),
            Scalar::Int(i) => Ok(i != 0),
            Scalar::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" | "" => Ok(false),
                other => Err(serde::de::Error::custom(format!(
                    "expected a boolean, got {other:?}"
                ))),
            },
            Scalar::Float(f) => Err(serde::de::Error::custom(format!(
                "expected a boolean, got {f}"
            ))),
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder over the `config` crate: YAML files and snippets, then `CHIRP__` env overrides.
pub struct ChirpConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ChirpConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ChirpConfigLoader {
    /// ```
    /// use chirp_config::ChirpConfigLoader;
    ///
    /// let config = ChirpConfigLoader::new()
    ///     .with_yaml_str("twitter:\n  consumer_key: ck\n  consumer_secret: cs\n")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.twitter.consumer_key, "ck");
    /// assert_eq!(config.twitter.api_base, "https://api.twitter.com/");
    /// assert_eq!(config.logging.filter, "info");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; the format follows the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`ChirpConfigLoader::with_file`], but a missing file is skipped.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge every source, expand `${VAR}` placeholders and deserialize.
    ///
    /// ```
    /// use chirp_config::ChirpConfigLoader;
    /// use secrecy::ExposeSecret;
    ///
    /// unsafe { std::env::set_var("DOC_CONSUMER_SECRET", "from-env"); }
    ///
    /// let config = ChirpConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// twitter:
    ///   consumer_key: "ck"
    ///   consumer_secret: "${DOC_CONSUMER_SECRET}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.twitter.consumer_secret.expose_secret(), "from-env");
    ///
    /// unsafe { std::env::remove_var("DOC_CONSUMER_SECRET"); }
    /// ```
    pub fn load(self) -> Result<ChirpConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR))
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
