//! Console configuration.
//!
//! Precedence: defaults < config file < command-line flags. An explicit
//! `--config` path must be readable; the default location is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::fetcher::FetchConfig;
use crate::logging::{LogFormat, LogLevel, LoggingConfig};

/// Narrowest dashboard the renderer lays out.
pub const MIN_DISPLAY_WIDTH: usize = 40;

/// Shortest watch-mode interval accepted.
pub const MIN_WATCH_INTERVAL: Duration = Duration::from_millis(100);

/// Cadence of refresh passes in watch mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub interval: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub seed_path: Option<PathBuf>,
    pub fetch: FetchConfig,
    pub watch: WatchConfig,
    pub display_width: usize,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed_path: None,
            fetch: FetchConfig::default(),
            watch: WatchConfig::default(),
            display_width: 100,
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch.request_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "fetch.request_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.fetch.stats_path.trim().is_empty() {
            return Err(ConfigError::Invalid("fetch.stats_path is required".into()));
        }
        if self.watch.interval < MIN_WATCH_INTERVAL {
            return Err(ConfigError::Invalid(
                "watch.interval_ms must be at least 100".into(),
            ));
        }
        if self.display_width < MIN_DISPLAY_WIDTH {
            return Err(ConfigError::Invalid(format!(
                "display.width must be at least {MIN_DISPLAY_WIDTH}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    #[serde(default)]
    seed: PartialSeedConfig,
    #[serde(default)]
    fetch: PartialFetchConfig,
    #[serde(default)]
    watch: PartialWatchConfig,
    #[serde(default)]
    display: PartialDisplayConfig,
    #[serde(default)]
    logging: PartialLoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
struct PartialSeedConfig {
    #[serde(default)]
    path: String,
}

#[derive(Debug, Default, Deserialize)]
struct PartialFetchConfig {
    #[serde(default)]
    request_timeout_ms: u64,
    #[serde(default)]
    stats_path: String,
}

#[derive(Debug, Default, Deserialize)]
struct PartialWatchConfig {
    #[serde(default)]
    interval_ms: u64,
}

#[derive(Debug, Default, Deserialize)]
struct PartialDisplayConfig {
    #[serde(default)]
    width: usize,
}

#[derive(Debug, Default, Deserialize)]
struct PartialLoggingConfig {
    #[serde(default)]
    level: String,
    #[serde(default)]
    format: String,
}

/// Loads the config and returns it with the file it came from, if any.
pub fn load_config(config_file: Option<&str>) -> Result<(Config, Option<PathBuf>), ConfigError> {
    let mut cfg = Config::default();

    let explicit = config_file
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);

    let (path_to_try, required) = match explicit {
        Some(path) => (Some(path), true),
        None => (default_config_path(), false),
    };

    let Some(path) = path_to_try else {
        return Ok((cfg, None));
    };

    match std::fs::read_to_string(&path) {
        Ok(text) => {
            let parsed: PartialConfig =
                serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?;
            apply_partial(&mut cfg, parsed)?;
            cfg.validate()?;
            Ok((cfg, Some(path)))
        }
        Err(source) if required => Err(ConfigError::Read { path, source }),
        Err(_) => Ok((cfg, None)),
    }
}

fn default_config_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.trim().is_empty() {
            return Some(
                PathBuf::from(xdg)
                    .join("storefront-console")
                    .join("config.yaml"),
            );
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(
                PathBuf::from(home)
                    .join(".config")
                    .join("storefront-console")
                    .join("config.yaml"),
            );
        }
    }
    None
}

fn apply_partial(cfg: &mut Config, partial: PartialConfig) -> Result<(), ConfigError> {
    if !partial.seed.path.trim().is_empty() {
        cfg.seed_path = Some(expand_tilde(partial.seed.path.trim())?);
    }
    if partial.fetch.request_timeout_ms > 0 {
        cfg.fetch.request_timeout = Duration::from_millis(partial.fetch.request_timeout_ms);
    }
    if !partial.fetch.stats_path.trim().is_empty() {
        cfg.fetch.stats_path = partial.fetch.stats_path.trim().to_string();
    }
    if partial.watch.interval_ms > 0 {
        cfg.watch.interval = Duration::from_millis(partial.watch.interval_ms);
    }
    if partial.display.width > 0 {
        cfg.display_width = partial.display.width;
    }
    if !partial.logging.level.trim().is_empty() {
        cfg.logging.level = parse_log_level(&partial.logging.level)?;
    }
    if !partial.logging.format.trim().is_empty() {
        cfg.logging.format = parse_log_format(&partial.logging.format)?;
    }
    Ok(())
}

pub fn parse_log_level(raw: &str) -> Result<LogLevel, ConfigError> {
    LogLevel::parse(raw).ok_or_else(|| {
        ConfigError::Invalid("logging.level must be one of trace, debug, info, warn, error".into())
    })
}

pub fn parse_log_format(raw: &str) -> Result<LogFormat, ConfigError> {
    LogFormat::parse(raw)
        .ok_or_else(|| ConfigError::Invalid("logging.format must be one of console, json".into()))
}

fn expand_tilde(input: &str) -> Result<PathBuf, ConfigError> {
    if input == "~" {
        let home = std::env::var("HOME").map_err(|_| ConfigError::MissingHome)?;
        return Ok(PathBuf::from(home));
    }
    if let Some(rest) = input.strip_prefix("~/") {
        let home = std::env::var("HOME").map_err(|_| ConfigError::MissingHome)?;
        return Ok(PathBuf::from(home).join(rest));
    }
    Ok(Path::new(input).to_path_buf())
}
