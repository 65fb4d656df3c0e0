use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use strum::{Display, EnumString};
use tracing::warn;

use crate::error::{LoadError, Result};
use crate::overlay::{ParamPair, QueryParamOverlay};

pub const CONCURRENT_USERS: &str = "CONCURRENT_USERS";
pub const TESTS_WORK_DIR: &str = "TESTS_WORK_DIR";
pub const SEARCH_TERMS_FILE: &str = "SEARCH_TERMS_FILE";
pub const COLLECTION_NAME: &str = "COLLECTION_NAME";
pub const QUERY_PARAMS: &str = "QUERY_PARAMS";
pub const ENDPOINT: &str = "ENDPOINT";
pub const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";
pub const REPORT_FORMAT: &str = "REPORT_FORMAT";
pub const SCENARIO_NAME: &str = "SCENARIO_NAME";

/// Process-local property store, consulted after the environment.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    values: BTreeMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a flat TOML file of `KEY = value` scalars. A missing file gives an
    /// empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(LoadError::PropertiesFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };
        Self::parse(&text).map_err(|reason| LoadError::PropertiesFile {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn parse(text: &str) -> std::result::Result<Self, String> {
        let table: toml::Table = text.parse().map_err(|e: toml::de::Error| e.to_string())?;
        let mut props = Self::default();
        for (key, value) in table {
            let value = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => return Err(format!("{key}: expected a scalar, got {}", other.type_str())),
            };
            props.values.insert(key, value);
        }
        Ok(props)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Resolves a key from the environment, then the property store, then a
/// literal default.
#[derive(Clone)]
pub struct ConfigResolver {
    env: EnvLookup,
    properties: Properties,
}

impl ConfigResolver {
    pub fn new(properties: Properties) -> Self {
        Self::with_env(properties, |key| std::env::var(key).ok())
    }

    pub fn with_env<F>(properties: Properties, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            env: Arc::new(env),
            properties,
        }
    }

    pub fn get(&self, key: &str, default: &str) -> String {
        (self.env)(key)
            .or_else(|| self.properties.get(key).map(str::to_string))
            .unwrap_or_else(|| default.to_string())
    }

    pub fn get_int(&self, key: &'static str, default: i64) -> Result<i64> {
        let raw = self.get(key, &default.to_string());
        raw.trim()
            .parse::<i64>()
            .map_err(|e| LoadError::config(key, raw, e))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ReportFormat {
    #[default]
    Human,
    Json,
}

/// Everything a run needs, resolved once before any worker starts.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub concurrency: usize,
    pub endpoint: String,
    pub collection_name: String,
    pub corpus_path: PathBuf,
    pub overlay_raw: String,
    pub request_timeout: Option<Duration>,
    pub report_format: ReportFormat,
    pub scenario_name: String,
}

impl RunConfig {
    pub fn resolve(cfg: &ConfigResolver) -> Result<Self> {
        let users = cfg.get_int(CONCURRENT_USERS, 10)?;
        let concurrency = if users < 1 {
            warn!(requested = users, "concurrency below 1, clamping to 1");
            1
        } else {
            usize::try_from(users).map_err(|e| LoadError::config(CONCURRENT_USERS, users.to_string(), e))?
        };

        let work_dir = cfg.get(TESTS_WORK_DIR, ".gatling");
        let terms_file = cfg.get(SEARCH_TERMS_FILE, "wikipedia-queries.txt");

        let timeout_secs = cfg.get_int(REQUEST_TIMEOUT_SECS, 30)?;
        let request_timeout = match timeout_secs {
            t if t < 0 => {
                return Err(LoadError::config(
                    REQUEST_TIMEOUT_SECS,
                    t.to_string(),
                    "must not be negative",
                ))
            }
            0 => None,
            t => Some(Duration::from_secs(t as u64)),
        };

        let format_raw = cfg.get(REPORT_FORMAT, "human");
        let report_format = format_raw
            .trim()
            .parse::<ReportFormat>()
            .map_err(|_| LoadError::config(REPORT_FORMAT, format_raw.clone(), "expected `human` or `json`"))?;

        Ok(Self {
            concurrency,
            endpoint: cfg
                .get(ENDPOINT, "http://localhost:8983")
                .trim_end_matches('/')
                .to_string(),
            collection_name: cfg.get(COLLECTION_NAME, "wikipedia"),
            corpus_path: Path::new(&work_dir).join(terms_file),
            overlay_raw: cfg.get(QUERY_PARAMS, ""),
            request_timeout,
            report_format,
            scenario_name: cfg.get(SCENARIO_NAME, "SearchTermsSimulation"),
        })
    }

    pub fn overlay(&self) -> Vec<ParamPair> {
        QueryParamOverlay::parse(&self.overlay_raw)
    }
}
