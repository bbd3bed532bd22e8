use std::path::Path;

use pvm_core::{DEFAULT_API_URL, DEFAULT_DOWNLOAD_BASE_URL, DEFAULT_TTL_HOURS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PvmSettings {
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_hours: u64,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_registry_api_url")]
    pub registry_api_url: String,

    #[serde(default = "default_download_base_url")]
    pub download_base_url: String,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

fn default_cache_ttl() -> u64 {
    DEFAULT_TTL_HOURS.unsigned_abs()
}

fn default_http_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_registry_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_download_base_url() -> String {
    DEFAULT_DOWNLOAD_BASE_URL.to_string()
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for PvmSettings {
    fn default() -> Self {
        Self {
            cache_ttl_hours: default_cache_ttl(),
            http_timeout_secs: default_http_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            registry_api_url: default_registry_api_url(),
            download_base_url: default_download_base_url(),
            debug_logging: false,
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

impl PvmSettings {
    /// Read settings from `path`. A missing or malformed file yields the
    /// defaults.
    pub fn load_from_path(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::PvmSettings;

    #[test]
    fn defaults_match_documented_values() {
        let settings = PvmSettings::default();

        assert_eq!(settings.cache_ttl_hours, 24);
        assert_eq!(settings.http_timeout_secs, 30);
        assert_eq!(settings.connect_timeout_secs, 10);
        assert_eq!(
            settings.registry_api_url,
            "https://api.github.com/repos/pulumi/pulumi"
        );
        assert_eq!(
            settings.download_base_url,
            "https://github.com/pulumi/pulumi/releases/download"
        );
        assert!(!settings.debug_logging);
        assert_eq!(settings.max_log_size_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn partial_settings_fill_missing_fields_with_defaults() {
        let settings: PvmSettings = serde_json::from_value(json!({
            "cache_ttl_hours": 2,
            "debug_logging": true
        }))
        .expect("partial settings should deserialize");

        assert_eq!(settings.cache_ttl_hours, 2);
        assert!(settings.debug_logging);
        assert_eq!(settings.http_timeout_secs, 30);
    }

    #[test]
    fn load_from_path_falls_back_to_defaults() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let missing = temp.path().join("settings.json");
        assert_eq!(PvmSettings::load_from_path(&missing), PvmSettings::default());

        std::fs::write(&missing, "{ not json").expect("settings file should be written");
        assert_eq!(PvmSettings::load_from_path(&missing), PvmSettings::default());
    }

    #[test]
    fn load_from_path_reads_overrides() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = temp.path().join("settings.json");
        std::fs::write(&path, r#"{"registry_api_url": "https://mirror.example/api"}"#)
            .expect("settings file should be written");

        let settings = PvmSettings::load_from_path(&path);

        assert_eq!(settings.registry_api_url, "https://mirror.example/api");
        assert_eq!(settings.cache_ttl_hours, 24);
    }
}
