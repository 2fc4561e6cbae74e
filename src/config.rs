//! Account configuration: session cookies and proxy settings.
//!
//! Resolution order is CLI flags, then the TOML config file, then
//! interactive prompts for whatever is still missing.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Credentials and connection settings for one X session.
///
/// `auth_token` and `csrf_token` are the `auth_token` and `ct0` cookies of a
/// logged-in browser session. `csrf_token` may be left empty; the client
/// fetches one on the first request. All fields default to empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountConfig {
    #[serde(default)]
    pub auth_token: String,
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub proxy_url: String,
}

impl AccountConfig {
    pub fn has_auth_token(&self) -> bool {
        !self.auth_token.is_empty()
    }

    /// Lay CLI flag values over the file-loaded config. A flag that was not
    /// given leaves the file value in place.
    pub fn with_overrides(
        mut self,
        auth_token: Option<String>,
        csrf_token: Option<String>,
        proxy_url: Option<String>,
    ) -> Self {
        if let Some(token) = auth_token {
            self.auth_token = token;
        }
        if let Some(token) = csrf_token {
            self.csrf_token = token;
        }
        if let Some(proxy) = proxy_url {
            self.proxy_url = proxy;
        }
        self
    }
}

/// Default config file location: `<user config dir>/xstats/config.toml`.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("xstats").join("config.toml"))
}

/// Load the config file. An explicitly given path must exist; a missing
/// file at the default location just yields the empty config.
pub fn load(explicit: Option<&Path>) -> Result<AccountConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(AccountConfig::default()),
        },
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let config = toml::from_str(&raw)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            "auth_token = \"abc123\"\ncsrf_token = \"def456\"\nproxy_url = \"http://127.0.0.1:8080\"\n",
        );
        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.auth_token, "abc123");
        assert_eq!(config.csrf_token, "def456");
        assert_eq!(config.proxy_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let file = write_config("auth_token = \"abc123\"\n");
        let config = load(Some(file.path())).unwrap();
        assert!(config.has_auth_token());
        assert!(config.csrf_token.is_empty());
        assert!(config.proxy_url.is_empty());
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(load(Some(&path)).is_err());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let file = write_config("auth_token = [not toml");
        assert!(load(Some(file.path())).is_err());
    }

    #[test]
    fn test_empty_config_has_no_auth_token() {
        assert!(!AccountConfig::default().has_auth_token());
    }

    #[test]
    fn test_overrides_beat_file_values() {
        let file = write_config("auth_token = \"from-file\"\nproxy_url = \"http://file\"\n");
        let config = load(Some(file.path()))
            .unwrap()
            .with_overrides(Some("from-flag".to_string()), None, None);
        assert_eq!(config.auth_token, "from-flag");
        assert_eq!(config.proxy_url, "http://file");
        assert!(config.csrf_token.is_empty());
    }
}
