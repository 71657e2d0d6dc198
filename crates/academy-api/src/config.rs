//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use academy_training::domain::narration::VoicePreference;

use crate::error::AppError;

/// Typed view of the server's environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind (`HOST`).
    pub host: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// Base URL of the academy backend (`ACADEMY_BACKEND_URL`).
    pub backend_url: String,
    /// Per-request timeout for backend calls (`ACADEMY_BACKEND_TIMEOUT_SECS`).
    pub backend_timeout: Duration,
    /// Idle time after which a session is swept (`ACADEMY_SESSION_TTL_SECS`).
    pub session_ttl: Duration,
    /// YAML catalog replacing the built-in one (`ACADEMY_CATALOG_PATH`).
    pub catalog_path: Option<PathBuf>,
    /// Narration voice choice (`ACADEMY_VOICE_PREFERENCES`,
    /// `ACADEMY_VOICE_LOCALE`).
    pub voice_preference: VoicePreference,
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
        let backend_url = lookup("ACADEMY_BACKEND_URL").ok_or_else(|| {
            AppError::Config("ACADEMY_BACKEND_URL environment variable must be set".to_string())
        })?;
        let backend_timeout = seconds(&lookup, "ACADEMY_BACKEND_TIMEOUT_SECS", 10)?;
        let session_ttl = seconds(&lookup, "ACADEMY_SESSION_TTL_SECS", 1_800)?;
        let catalog_path = lookup("ACADEMY_CATALOG_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        let mut voice_preference = VoicePreference::default();
        if let Some(names) = lookup("ACADEMY_VOICE_PREFERENCES") {
            voice_preference.preferred_names = names
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect();
        }
        if let Some(locale) = lookup("ACADEMY_VOICE_LOCALE") {
            voice_preference.locale = locale;
        }

        Ok(Self {
            host,
            port,
            backend_url,
            backend_timeout,
            session_ttl,
            catalog_path,
            voice_preference,
        })
    }

    /// The address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, AppError> {
    let secs = match lookup(key) {
        Some(value) => value.trim().parse::<u64>().map_err(|e| {
            AppError::Config(format!("{key} must be a whole number of seconds: {e}"))
        })?,
        None => default,
    };
    if secs == 0 {
        return Err(AppError::Config(format!("{key} must be greater than zero")));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_backend_is_set() {
        let config =
            ServerConfig::from_lookup(lookup_from(&[("ACADEMY_BACKEND_URL", "http://backend")]))
                .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.catalog_path, None);
        assert_eq!(config.backend_timeout, Duration::from_secs(10));
        assert_eq!(config.session_ttl, Duration::from_secs(1_800));
        assert_eq!(config.voice_preference, VoicePreference::default());
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_missing_backend_url_is_config_error() {
        let result = ServerConfig::from_lookup(lookup_from(&[]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let result = ServerConfig::from_lookup(lookup_from(&[
            ("ACADEMY_BACKEND_URL", "http://backend"),
            ("PORT", "eighty"),
        ]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_timeouts_are_read_in_seconds() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("ACADEMY_BACKEND_URL", "http://backend"),
            ("ACADEMY_BACKEND_TIMEOUT_SECS", "3"),
            ("ACADEMY_SESSION_TTL_SECS", " 600 "),
        ]))
        .unwrap();

        assert_eq!(config.backend_timeout, Duration::from_secs(3));
        assert_eq!(config.session_ttl, Duration::from_secs(600));
    }

    #[test]
    fn test_zero_session_ttl_is_config_error() {
        let result = ServerConfig::from_lookup(lookup_from(&[
            ("ACADEMY_BACKEND_URL", "http://backend"),
            ("ACADEMY_SESSION_TTL_SECS", "0"),
        ]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_voice_preferences_are_split_and_trimmed() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("ACADEMY_BACKEND_URL", "http://backend"),
            ("ACADEMY_VOICE_PREFERENCES", " Karen , ,Moira"),
            ("ACADEMY_VOICE_LOCALE", "en-AU"),
            ("ACADEMY_CATALOG_PATH", "/etc/academy/catalog.yaml"),
        ]))
        .unwrap();

        assert_eq!(config.voice_preference.preferred_names, vec!["Karen", "Moira"]);
        assert_eq!(config.voice_preference.locale, "en-AU");
        assert_eq!(
            config.catalog_path,
            Some(PathBuf::from("/etc/academy/catalog.yaml"))
        );
    }
}
