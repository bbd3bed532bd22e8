use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use pvm_core::{Activation, GitHubRegistry, Installer, ReleaseCache, VersionResolver};
use pvm_platform::ToolPaths;
use pvm_types::SystemClock;

use crate::error::AppError;
use crate::settings::PvmSettings;

const USER_AGENT: &str = concat!("pvm/", env!("CARGO_PKG_VERSION"));
const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Engine components wired for one invocation.
pub struct Context {
    pub paths: ToolPaths,
    pub resolver: VersionResolver,
    pub installer: Installer,
    pub activation: Activation,
}

impl Context {
    pub fn new(paths: ToolPaths, settings: &PvmSettings) -> Result<Self, AppError> {
        let token = std::env::var(TOKEN_ENV_VAR).ok();
        Self::with_token(paths, settings, token)
    }

    pub fn with_token(
        paths: ToolPaths,
        settings: &PvmSettings,
        token: Option<String>,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.http_timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|error| AppError::HttpClient(error.to_string()))?;

        let registry = GitHubRegistry::new(client.clone(), settings.registry_api_url.as_str())
            .with_token(token);
        let ttl_hours = i64::try_from(settings.cache_ttl_hours).unwrap_or(i64::MAX);
        let ttl = TimeDelta::try_hours(ttl_hours).unwrap_or(TimeDelta::MAX);
        let cache = ReleaseCache::new(paths.cache_file(), Arc::new(registry), Arc::new(SystemClock))
            .with_ttl(ttl);

        Ok(Self {
            resolver: VersionResolver::new(cache),
            installer: Installer::new(client, paths.clone(), settings.download_base_url.as_str()),
            activation: Activation::new(paths.clone()),
            paths,
        })
    }
}
