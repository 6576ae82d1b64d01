use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const ENV_PREFIX: &str = "JOBBOARD_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Hub base URL; request paths (`/api/...`) are appended to it.
    pub api_base_url: String,
    /// 0 disables the timeout.
    pub request_timeout_secs: u64,
    /// Where the credential and forced-logout message are kept.
    pub state_dir: PathBuf,
    pub verbose: bool,
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            state_dir: default_state_dir(),
            verbose: false,
            json_logs: false,
        }
    }
}

fn default_state_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home).join(".jobboard"),
        _ => PathBuf::from(".jobboard"),
    }
}

impl AppConfig {
    /// Load defaults, then the config file, then `JOBBOARD_*` variables,
    /// then `overrides` (usually the parsed command line).
    ///
    /// The file is looked up in the state directory chosen by the env and
    /// command-line layers, so `--state-dir` also moves `config.toml`.
    pub fn new<T: Serialize>(overrides: Option<&T>) -> Result<Self> {
        let with_overrides = |figment: Figment| match overrides {
            Some(overrides) => figment.merge(Serialized::defaults(overrides)),
            None => figment,
        };
        let env = || Env::prefixed(ENV_PREFIX).ignore(&["config", "password", "node_token"]);

        let state_dir: PathBuf = with_overrides(
            Figment::from(Serialized::defaults(AppConfig::default())).merge(env()),
        )
        .extract_inner("state_dir")
        .context("Invalid state_dir")?;
        let explicit = std::env::var_os("JOBBOARD_CONFIG").map(PathBuf::from);

        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(Self::config_path(explicit, &state_dir)))
            .merge(env());

        Self::from_figment(with_overrides(figment))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let mut config: AppConfig = figment.extract().context("Invalid configuration")?;
        config.api_base_url = config.api_base_url.trim_end_matches('/').to_string();
        if config.api_base_url.is_empty() {
            anyhow::bail!("api_base_url must not be empty");
        }
        Ok(config)
    }

    /// `explicit` (from `$JOBBOARD_CONFIG`), else `config.toml` in `state_dir`.
    pub fn config_path(explicit: Option<PathBuf>, state_dir: &Path) -> PathBuf {
        match explicit {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => state_dir.join("config.toml"),
        }
    }

    /// Directory for per-session values such as the forced-logout message.
    pub fn runtime_dir(&self) -> PathBuf {
        self.state_dir.join("runtime")
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Overrides {
        #[serde(skip_serializing_if = "Option::is_none")]
        api_base_url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        verbose: Option<bool>,
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
    }

    #[test]
    fn defaults() {
        let config = AppConfig::from_figment(base()).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(60)));
        assert!(!config.verbose);
    }

    #[test]
    fn file_then_overrides() {
        let figment = base()
            .merge(Toml::string(
                r#"
                api_base_url = "https://hub.example.com/"
                request_timeout_secs = 0
                state_dir = "/tmp/jobboard-test"
                "#,
            ))
            .merge(Serialized::defaults(Overrides {
                api_base_url: None,
                verbose: Some(true),
            }));

        let config = AppConfig::from_figment(figment).unwrap();
        assert_eq!(config.api_base_url, "https://hub.example.com");
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.runtime_dir(), PathBuf::from("/tmp/jobboard-test/runtime"));
        assert!(config.verbose);
    }

    #[test]
    fn unset_overrides_do_not_clobber() {
        let figment = base()
            .merge(Toml::string(r#"api_base_url = "http://hub:9000""#))
            .merge(Serialized::defaults(Overrides {
                api_base_url: None,
                verbose: None,
            }));
        assert_eq!(
            AppConfig::from_figment(figment).unwrap().api_base_url,
            "http://hub:9000"
        );
    }

    #[test]
    fn config_file_follows_state_dir() {
        assert_eq!(
            AppConfig::config_path(None, Path::new("/srv/jobboard")),
            PathBuf::from("/srv/jobboard/config.toml")
        );
        assert_eq!(
            AppConfig::config_path(Some(PathBuf::new()), Path::new("/srv/jobboard")),
            PathBuf::from("/srv/jobboard/config.toml")
        );
        assert_eq!(
            AppConfig::config_path(Some(PathBuf::from("/etc/jobboard.toml")), Path::new("/srv")),
            PathBuf::from("/etc/jobboard.toml")
        );
    }

    #[test]
    fn state_dir_override_relocates_config_file() {
        #[derive(Serialize)]
        struct StateDir {
            state_dir: PathBuf,
        }

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            r#"api_base_url = "http://relocated:9000""#,
        )
        .unwrap();

        let config = AppConfig::new(Some(&StateDir {
            state_dir: dir.path().to_path_buf(),
        }))
        .unwrap();
        assert_eq!(config.state_dir, dir.path());
        assert_eq!(config.api_base_url, "http://relocated:9000");
    }

    #[test]
    fn rejects_bad_types() {
        let figment = base().merge(Toml::string(r#"request_timeout_secs = "soon""#));
        assert!(AppConfig::from_figment(figment).is_err());
    }
}
