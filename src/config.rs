//! Process configuration, read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `COMMANDEER_BIND` | `0.0.0.0:8000` |
//! | `COMMANDEER_DATABASE` | `commands.db` (`:memory:` for a throwaway store) |
//! | `COMMANDEER_LOG_FILE` | `logs/app.log` |
//! | `COMMANDEER_LOG_ROTATION` | `500MB` |
//! | `COMMANDEER_LOG_LEVEL` | `info` |

use std::net::SocketAddr;
use std::path::PathBuf;

use tracing_subscriber::filter::LevelFilter;

use crate::error::Error;
use crate::sink::LogConfig;

/// Everything the binary needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind: SocketAddr,
    pub database: PathBuf,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            database: PathBuf::from("commands.db"),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::default();

        if let Some(bind) = lookup("COMMANDEER_BIND") {
            config.bind = bind
                .parse()
                .map_err(|e| Error::Config(format!("COMMANDEER_BIND `{bind}`: {e}")))?;
        }
        if let Some(path) = lookup("COMMANDEER_DATABASE") {
            config.database = PathBuf::from(path);
        }
        if let Some(path) = lookup("COMMANDEER_LOG_FILE") {
            config.log.path = PathBuf::from(path);
        }
        if let Some(size) = lookup("COMMANDEER_LOG_ROTATION") {
            config.log.rotation_bytes = parse_size(&size)
                .map_err(|e| Error::Config(format!("COMMANDEER_LOG_ROTATION: {e}")))?;
        }
        if let Some(level) = lookup("COMMANDEER_LOG_LEVEL") {
            config.log.level = level
                .parse::<LevelFilter>()
                .map_err(|e| Error::Config(format!("COMMANDEER_LOG_LEVEL `{level}`: {e}")))?;
        }

        Ok(config)
    }
}

/// Parses a size string like "500MB", "1.5G", "1024k" or "4096" into bytes.
///
/// Suffixes (case-insensitive): `GB`/`G`, `MB`/`M`, `KB`/`K`, `B` or none.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim().to_uppercase();
    if s.is_empty() {
        return Err("empty size string".to_owned());
    }

    let num_end = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    let (num, suffix) = s.split_at(num_end);

    let num: f64 = num.parse().map_err(|_| format!("invalid number `{num}`"))?;
    let multiplier: u64 = match suffix.trim() {
        "GB" | "G" => 1024 * 1024 * 1024,
        "MB" | "M" => 1024 * 1024,
        "KB" | "K" => 1024,
        "B" | "" => 1,
        other => return Err(format!("unknown size suffix `{other}`")),
    };

    let bytes = num * multiplier as f64;
    if bytes < 1.0 {
        return Err(format!("size must be at least one byte, got `{s}`"));
    }
    Ok(bytes as u64)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::sink::DEFAULT_ROTATION_BYTES;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind.to_string(), "0.0.0.0:8000");
        assert_eq!(config.database, PathBuf::from("commands.db"));
        assert_eq!(config.log.path, PathBuf::from("logs/app.log"));
        assert_eq!(config.log.rotation_bytes, DEFAULT_ROTATION_BYTES);
        assert_eq!(config.log.level, LevelFilter::INFO);
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup(&[
            ("COMMANDEER_BIND", "127.0.0.1:9000"),
            ("COMMANDEER_DATABASE", ":memory:"),
            ("COMMANDEER_LOG_FILE", "/tmp/cmd.log"),
            ("COMMANDEER_LOG_ROTATION", "10 mb"),
            ("COMMANDEER_LOG_LEVEL", "warn"),
        ]))
        .unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.database, PathBuf::from(":memory:"));
        assert_eq!(config.log.path, PathBuf::from("/tmp/cmd.log"));
        assert_eq!(config.log.rotation_bytes, 10 * 1024 * 1024);
        assert_eq!(config.log.level, LevelFilter::WARN);
    }

    #[test]
    fn bad_values_are_config_errors() {
        for (key, value) in [
            ("COMMANDEER_BIND", "not-an-addr"),
            ("COMMANDEER_LOG_ROTATION", "12XB"),
            ("COMMANDEER_LOG_LEVEL", "loud"),
        ] {
            let err = Config::from_lookup(lookup(&[(key, value)])).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{key}: {err}");
        }
    }

    #[test]
    fn parse_size_units() {
        assert_eq!(parse_size("4096"), Ok(4096));
        assert_eq!(parse_size("1k"), Ok(1024));
        assert_eq!(parse_size("500MB"), Ok(500 * 1024 * 1024));
        assert_eq!(parse_size("1.5G"), Ok(1536 * 1024 * 1024));
    }

    #[test]
    fn parse_size_rejects_garbage() {
        assert!(parse_size("").is_err());
        assert!(parse_size("MB").is_err());
        assert!(parse_size("0").is_err());
        assert!(parse_size("5TB").is_err());
    }
}
