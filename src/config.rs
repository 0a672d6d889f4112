//! Configuration module for the tweetsearch utility.
//!
//! Credentials and output defaults are read once from the `[common]` section
//! of an INI file. Any key missing from the file falls back to the environment
//! variable `TWEETSEARCH_<KEY>` (e.g. `TWEETSEARCH_CONSUMER_TOKEN`).

use std::env;
use std::path::{Path, PathBuf};

use ini::Ini;
use log::{debug, info, warn};

use crate::error::ConfigError;

/// Config file used when neither `--config` nor `TWEETSEARCH_CONFIG` is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.ini";

/// Section holding every key.
pub const CONFIG_SECTION: &str = "common";

/// Base URL of the Twitter API, overridable with `TWEETSEARCH_API_BASE`.
pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";

/// Credentials for the Twitter/X API.
///
/// Search authenticates with the consumer token and secret only. The account
/// username/password and user access token/secret are carried for
/// completeness and are optional.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub consumer_token: String,
    pub consumer_secret: String,
    pub access_token: Option<String>,
    pub access_secret: Option<String>,
}

/// Immutable configuration for one invocation.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub credentials: Credentials,
    /// Output format used when `--format` is not given
    pub default_format: String,
    /// Language used when `--lang` is not given or is not two characters
    pub default_lang: String,
    pub api_base: String,
}

/// Masks a secret for logging, keeping at most 8 characters at each end.
pub(crate) fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    let len = chars.len();
    let prefix: String = chars.iter().take(8).collect();
    if len > 16 {
        let suffix: String = chars[len - 8..].iter().collect();
        format!("{}...{}", prefix, suffix)
    } else {
        format!("{}...", prefix)
    }
}

/// Name of the environment variable consulted for `key`.
pub fn env_var_for(key: &str) -> String {
    format!("TWEETSEARCH_{}", key.to_uppercase())
}

/// Resolves the config file path: `--config`, then `TWEETSEARCH_CONFIG`, then `config.ini`.
pub fn config_path(cli_value: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_value {
        return path.to_path_buf();
    }
    match env::var("TWEETSEARCH_CONFIG") {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

/// Looks up a key in the `[common]` section, then in the environment.
fn lookup(ini: &Ini, key: &str) -> Option<String> {
    let from_file = ini
        .section(Some(CONFIG_SECTION))
        .and_then(|section| section.get(key))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    if from_file.is_some() {
        return from_file;
    }

    match env::var(env_var_for(key)) {
        Ok(value) if !value.trim().is_empty() => {
            debug!("Using {} from environment", env_var_for(key));
            Some(value.trim().to_string())
        }
        _ => None,
    }
}

fn require(ini: &Ini, key: &str) -> Result<String, ConfigError> {
    lookup(ini, key).ok_or_else(|| ConfigError::MissingKey {
        key: key.to_string(),
        env_var: env_var_for(key),
    })
}

fn optional(ini: &Ini, key: &str) -> Option<String> {
    let value = lookup(ini, key);
    if value.is_none() {
        debug!("Optional config key '{}' is not set", key);
    }
    value
}

impl SearchConfig {
    /// Loads the configuration from an INI file.
    ///
    /// A missing file is not an error: every key can come from the environment.
    /// A file that exists but cannot be parsed is.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Read` if the file exists but cannot be read or parsed
    /// - `ConfigError::MissingKey` if a required key is in neither the file nor the environment
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading configuration from {}", path.display());

        let ini = if path.exists() {
            Ini::load_from_file(path).map_err(|e| ConfigError::Read {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        } else {
            warn!(
                "Config file {} not found, reading settings from environment only",
                path.display()
            );
            Ini::new()
        };

        if path.exists() && ini.section(Some(CONFIG_SECTION)).is_none() {
            warn!(
                "Config file {} has no [{}] section",
                path.display(),
                CONFIG_SECTION
            );
        }

        Self::from_ini(&ini)
    }

    /// Builds the configuration from already-parsed INI content.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let consumer_token = require(ini, "consumer_token")?;
        let consumer_secret = require(ini, "consumer_secret")?;
        debug!("Consumer token (masked): {}", mask_secret(&consumer_token));
        debug!("Consumer secret (masked): {}", mask_secret(&consumer_secret));

        let credentials = Credentials {
            username: optional(ini, "username"),
            password: optional(ini, "password"),
            consumer_token,
            consumer_secret,
            access_token: optional(ini, "access_token"),
            access_secret: optional(ini, "access_secret"),
        };

        if let Some(token) = &credentials.access_token {
            debug!("Access token (masked): {}", mask_secret(token));
        }

        let default_format = require(ini, "default_format")?;
        let default_lang = require(ini, "default_lang")?;

        let api_base = match env::var("TWEETSEARCH_API_BASE") {
            Ok(base) if !base.is_empty() => {
                info!("Using API base URL override: {}", base);
                base.trim_end_matches('/').to_string()
            }
            _ => DEFAULT_API_BASE.to_string(),
        };

        info!(
            "Configuration loaded (default format: {}, default language: {})",
            default_format, default_lang
        );

        Ok(SearchConfig {
            credentials,
            default_format,
            default_lang,
            api_base,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::ENV_LOCK;
    use std::fs;
    use tempfile::TempDir;

    const FULL_CONFIG: &str = "\
[common]
username = someone
password = hunter2
consumer_token = ck_1234567890
consumer_secret = cs_abcdefghijklmnopqrstuvwxyz
access_token = at_1234567890
access_secret = as_1234567890
default_format = csv
default_lang = en
";

    fn clear_env() {
        for key in [
            "username",
            "password",
            "consumer_token",
            "consumer_secret",
            "access_token",
            "access_secret",
            "default_format",
            "default_lang",
            "config",
            "api_base",
        ] {
            env::remove_var(env_var_for(key));
        }
    }

    #[test]
    fn test_load_full_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("config.ini");
        fs::write(&path, FULL_CONFIG).unwrap();

        let config = SearchConfig::load(&path).unwrap();
        assert_eq!(config.credentials.consumer_token, "ck_1234567890");
        assert_eq!(
            config.credentials.consumer_secret,
            "cs_abcdefghijklmnopqrstuvwxyz"
        );
        assert_eq!(config.credentials.username.as_deref(), Some("someone"));
        assert_eq!(config.credentials.access_secret.as_deref(), Some("as_1234567890"));
        assert_eq!(config.default_format, "csv");
        assert_eq!(config.default_lang, "en");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_missing_key_reports_env_var() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let ini = Ini::load_from_str("[common]\nconsumer_token = ck\n").unwrap();
        match SearchConfig::from_ini(&ini) {
            Err(ConfigError::MissingKey { key, env_var }) => {
                assert_eq!(key, "consumer_secret");
                assert_eq!(env_var, "TWEETSEARCH_CONSUMER_SECRET");
            }
            other => panic!("Expected MissingKey, got: {:?}", other),
        }
    }

    #[test]
    fn test_environment_fills_missing_keys() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("TWEETSEARCH_CONSUMER_SECRET", "from_env");
        env::set_var("TWEETSEARCH_DEFAULT_FORMAT", "xlsx");
        env::set_var("TWEETSEARCH_DEFAULT_LANG", "fr");
        env::set_var("TWEETSEARCH_API_BASE", "http://127.0.0.1:9999/");

        let ini = Ini::load_from_str("[common]\nconsumer_token = ck\n").unwrap();
        let config = SearchConfig::from_ini(&ini).unwrap();

        assert_eq!(config.credentials.consumer_token, "ck");
        assert_eq!(config.credentials.consumer_secret, "from_env");
        assert!(config.credentials.access_token.is_none());
        assert_eq!(config.default_format, "xlsx");
        assert_eq!(config.default_lang, "fr");
        assert_eq!(config.api_base, "http://127.0.0.1:9999");

        clear_env();
    }

    #[test]
    fn test_missing_file_uses_environment() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        for (key, value) in [
            ("consumer_token", "ck"),
            ("consumer_secret", "cs"),
            ("default_format", "csv"),
            ("default_lang", "de"),
        ] {
            env::set_var(env_var_for(key), value);
        }

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = SearchConfig::load(&temp_dir.path().join("absent.ini")).unwrap();
        assert_eq!(config.default_lang, "de");

        clear_env();
    }

    #[test]
    fn test_config_path_precedence() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        assert_eq!(config_path(None), PathBuf::from(DEFAULT_CONFIG_FILE));

        env::set_var("TWEETSEARCH_CONFIG", "/etc/tweetsearch.ini");
        assert_eq!(config_path(None), PathBuf::from("/etc/tweetsearch.ini"));
        assert_eq!(
            config_path(Some(Path::new("mine.ini"))),
            PathBuf::from("mine.ini")
        );

        clear_env();
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("short"), "short...");
        assert_eq!(mask_secret("0123456789ab"), "01234567...");
        assert_eq!(
            mask_secret("0123456789abcdefXYZ"),
            "01234567...bcdefXYZ"
        );
    }
}
