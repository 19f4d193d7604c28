use serde::Deserialize;
use std::{net::IpAddr, path::PathBuf};

pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_FILTER_CACHE_CAPACITY: usize = 1_024;
pub const DEFAULT_MAX_CONCURRENT_QUERIES: usize = 64;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// IP address the HTTP listener binds to
    pub ip: IpAddr,

    /// HTTP port
    pub port: u16,

    /// Value for `Access-Control-Allow-Origin`; no header when unset
    pub cors_origin: Option<String>,

    /// Upper bound on a single query scan before it is cancelled
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    #[serde(default = "default_max_concurrent_queries")]
    pub max_concurrent_queries: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetSettings {
    /// JSON array of records, relative to the settings directory
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuerySettings {
    /// Distinct filter texts kept parsed; 0 disables the cache
    #[serde(default = "default_filter_cache_capacity")]
    pub filter_cache_capacity: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            filter_cache_capacity: DEFAULT_FILTER_CACHE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub dataset: DatasetSettings,
    #[serde(default)]
    pub query: QuerySettings,
}

fn default_query_timeout_ms() -> u64 {
    DEFAULT_QUERY_TIMEOUT_MS
}

fn default_filter_cache_capacity() -> usize {
    DEFAULT_FILTER_CACHE_CAPACITY
}

fn default_max_concurrent_queries() -> usize {
    DEFAULT_MAX_CONCURRENT_QUERIES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_settings_parse() {
        let text = r#"
            [server]
            ip = "127.0.0.1"
            port = 8080
            cors_origin = "http://localhost:3000"
            query_timeout_ms = 250
            max_concurrent_queries = 4

            [dataset]
            path = "data/movies.json"

            [query]
            filter_cache_capacity = 16
        "#;

        let s: Settings = toml::from_str(text).expect("parse settings");
        assert_eq!(s.server.ip.to_string(), "127.0.0.1");
        assert_eq!(s.server.port, 8080);
        assert_eq!(s.server.cors_origin.as_deref(), Some("http://localhost:3000"));
        assert_eq!(s.server.query_timeout_ms, 250);
        assert_eq!(s.server.max_concurrent_queries, 4);
        assert_eq!(s.dataset.path, PathBuf::from("data/movies.json"));
        assert_eq!(s.query.filter_cache_capacity, 16);
    }

    #[test]
    fn optional_settings_fall_back_to_defaults() {
        let text = r#"
            [server]
            ip = "0.0.0.0"
            port = 3000

            [dataset]
            path = "movies.json"
        "#;

        let s: Settings = toml::from_str(text).expect("parse settings");
        assert!(s.server.cors_origin.is_none());
        assert_eq!(s.server.query_timeout_ms, DEFAULT_QUERY_TIMEOUT_MS);
        assert_eq!(s.server.max_concurrent_queries, DEFAULT_MAX_CONCURRENT_QUERIES);
        assert_eq!(s.query.filter_cache_capacity, DEFAULT_FILTER_CACHE_CAPACITY);
    }

    #[test]
    fn missing_dataset_section_is_an_error() {
        let text = r#"
            [server]
            ip = "0.0.0.0"
            port = 3000
        "#;

        assert!(toml::from_str::<Settings>(text).is_err());
    }
}
