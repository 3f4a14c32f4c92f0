use std::{env, fs, path::Path};
use serde::Deserialize;
use thiserror::Error;

const SETTINGS_FILENAME: &str = "settings.json";

/// Placeholder shipped in the sample `.env`; treated the same as an unset PAT.
pub const PAT_PLACEHOLDER: &str = "your-pat-token-here";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings file {path}: {message}")]
    Read { path: String, message: String },

    #[error("cannot parse settings file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tcp_socket_binding: String,
    pub tcp_socket_port: u16,
    pub db_path: String,
    pub cors_origins: Vec<String>,
    pub rate_limit_window_ms: u64,
    pub rate_limit_max: u32,
    pub ai_rate_limit_window_ms: u64,
    pub ai_rate_limit_max: u32,
    pub jwt_secret: String,
    pub jwt_expiration_in_minutes: u32,
    pub static_dir: Option<String>,
    pub log_level: String,
    pub ado: AdoSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdoSettings {
    pub organization: Option<String>,
    pub personal_access_token: Option<String>,
    /// Overrides `https://dev.azure.com/{org}` derivation (ADO Server, local doubles).
    pub base_url: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tcp_socket_binding: "0.0.0.0".to_string(),
            tcp_socket_port: 3001,
            db_path: "worksync.redb".to_string(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
            rate_limit_window_ms: 15 * 60 * 1000,
            rate_limit_max: 100,
            ai_rate_limit_window_ms: 60 * 60 * 1000,
            ai_rate_limit_max: 100,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_in_minutes: 24 * 60,
            static_dir: None,
            log_level: "info".to_string(),
            ado: AdoSettings::default(),
        }
    }
}

impl Default for AdoSettings {
    fn default() -> Self {
        Self {
            organization: None,
            personal_access_token: None,
            base_url: None,
            request_timeout_secs: 30,
        }
    }
}

impl AdoSettings {
    /// The configured PAT, ignoring blanks and the sample placeholder.
    pub fn pat(&self) -> Option<&str> {
        self.personal_access_token
            .as_deref()
            .map(str::trim)
            .filter(|pat| !pat.is_empty() && *pat != PAT_PLACEHOLDER)
    }

    pub fn organization(&self) -> Option<&str> {
        self.organization
            .as_deref()
            .map(str::trim)
            .filter(|org| !org.is_empty())
    }
}

impl Settings {
    /// Reads `settings.json` when present, then applies environment overrides.
    pub fn load() -> Result<Settings, ConfigError> {
        let mut settings = Self::from_file(Path::new(SETTINGS_FILENAME))?;
        settings.apply_overrides(|key| env::var(key).ok())?;
        Ok(settings)
    }

    fn from_file(path: &Path) -> Result<Settings, ConfigError> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Overlays values from a key lookup; `load` feeds it the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.tcp_socket_binding = host;
        }
        if let Some(port) = lookup("PORT") {
            self.tcp_socket_port = parse_number("PORT", port)?;
        }
        if let Some(path) = lookup("DB_PATH") {
            self.db_path = path;
        }
        if let Some(origins) = lookup("CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(window) = lookup("RATE_LIMIT_WINDOW_MS") {
            self.rate_limit_window_ms = parse_number("RATE_LIMIT_WINDOW_MS", window)?;
        }
        if let Some(max) = lookup("RATE_LIMIT_MAX") {
            self.rate_limit_max = parse_number("RATE_LIMIT_MAX", max)?;
        }
        if let Some(window) = lookup("AI_RATE_LIMIT_WINDOW_MS") {
            self.ai_rate_limit_window_ms = parse_number("AI_RATE_LIMIT_WINDOW_MS", window)?;
        }
        if let Some(max) = lookup("AI_RATE_LIMIT_MAX") {
            self.ai_rate_limit_max = parse_number("AI_RATE_LIMIT_MAX", max)?;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Some(minutes) = lookup("JWT_EXPIRATION_IN_MINUTES") {
            self.jwt_expiration_in_minutes = parse_number("JWT_EXPIRATION_IN_MINUTES", minutes)?;
        }
        if let Some(dir) = lookup("STATIC_DIR") {
            self.static_dir = Some(dir);
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(org) = lookup("ADO_DEFAULT_ORGANIZATION") {
            self.ado.organization = Some(org);
        }
        if let Some(pat) = lookup("ADO_PERSONAL_ACCESS_TOKEN") {
            self.ado.personal_access_token = Some(pat);
        }
        if let Some(url) = lookup("ADO_BASE_URL") {
            self.ado.base_url = Some(url);
        }
        if let Some(secs) = lookup("ADO_REQUEST_TIMEOUT_SECS") {
            self.ado.request_timeout_secs = parse_number("ADO_REQUEST_TIMEOUT_SECS", secs)?;
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.tcp_socket_port, 3001);
        assert_eq!(s.rate_limit_window_ms, 900_000);
        assert_eq!(s.rate_limit_max, 100);
        assert_eq!(s.ado.request_timeout_secs, 30);
        assert!(s.ado.pat().is_none());
    }

    #[test]
    fn environment_overrides_apply() {
        let mut s = Settings::default();
        s.apply_overrides(lookup_from(&[
            ("PORT", "8080"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
            ("ADO_DEFAULT_ORGANIZATION", "contoso"),
            ("ADO_PERSONAL_ACCESS_TOKEN", "secret"),
            ("RATE_LIMIT_MAX", "5"),
        ]))
        .unwrap();

        assert_eq!(s.tcp_socket_port, 8080);
        assert_eq!(s.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(s.ado.organization(), Some("contoso"));
        assert_eq!(s.ado.pat(), Some("secret"));
        assert_eq!(s.rate_limit_max, 5);
    }

    #[test]
    fn placeholder_pat_counts_as_missing() {
        let mut s = Settings::default();
        s.apply_overrides(lookup_from(&[("ADO_PERSONAL_ACCESS_TOKEN", PAT_PLACEHOLDER)]))
            .unwrap();
        assert!(s.ado.pat().is_none());
    }

    #[test]
    fn bad_number_is_a_config_error() {
        let mut s = Settings::default();
        let err = s.apply_overrides(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "PORT", .. }));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::from_file(&dir.path().join("settings.json")).unwrap();
        assert_eq!(s.db_path, "worksync.redb");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"tcp_socket_port": 4000, "ado": {"organization": "fabrikam"}}"#).unwrap();

        let s = Settings::from_file(&path).unwrap();
        assert_eq!(s.tcp_socket_port, 4000);
        assert_eq!(s.ado.organization(), Some("fabrikam"));
        assert_eq!(s.ado.request_timeout_secs, 30);
    }
}
