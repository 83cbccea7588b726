//! Client configuration loaded once at startup from `rideover.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::flags::{FeatureFlags, FlagOverrides};
use crate::geo::Coordinates;
use crate::location_provider::PermissionStatus;
use crate::map::{DEFAULT_CENTER, DEFAULT_LATITUDE_DELTA, DEFAULT_LONGITUDE_DELTA};

pub const CONFIG_FILE_NAME: &str = "rideover.json";
pub const CONFIG_FILE_VERSION: u32 = 1;
pub const CONFIG_PATH_ENV: &str = "RIDEOVER_CONFIG";
pub const IDENTITY_URL_ENV: &str = "RIDEOVER_SUPABASE_URL";
pub const IDENTITY_ANON_KEY_ENV: &str = "RIDEOVER_SUPABASE_ANON_KEY";

pub const DEFAULT_SEARCH_DELAY_MS: u64 = 500;
pub const DEFAULT_SESSION_FILE_NAME: &str = "rideover_session.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub version: u32,
    pub flags: FlagOverrides,
    pub identity: IdentitySettings,
    pub search: SearchSettings,
    pub map: MapSettings,
    pub location: LocationSettings,
    pub booking: BookingSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FILE_VERSION,
            flags: FlagOverrides::new(),
            identity: IdentitySettings::default(),
            search: SearchSettings::default(),
            map: MapSettings::default(),
            location: LocationSettings::default(),
            booking: BookingSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityMode {
    #[default]
    Local,
    Remote,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentitySettings {
    pub mode: IdentityMode,
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub session_file: Option<PathBuf>,
}

impl IdentitySettings {
    /// Base URL and anon key for the remote service; both must be non-blank.
    pub fn remote_endpoint(&self) -> Result<(String, String), ConfigError> {
        let url = non_blank(self.url.as_deref())
            .ok_or(ConfigError::MissingIdentitySetting(IDENTITY_URL_ENV))?;
        let anon_key = non_blank(self.anon_key.as_deref())
            .ok_or(ConfigError::MissingIdentitySetting(IDENTITY_ANON_KEY_ENV))?;
        Ok((url.trim_end_matches('/').to_string(), anon_key.to_string()))
    }

    pub fn session_file_path(&self) -> PathBuf {
        self.session_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE_NAME))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchSettings {
    pub delay_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_SEARCH_DELAY_MS,
        }
    }
}

impl SearchSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapSettings {
    pub default_center: Coordinates,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            default_center: DEFAULT_CENTER,
            latitude_delta: DEFAULT_LATITUDE_DELTA,
            longitude_delta: DEFAULT_LONGITUDE_DELTA,
        }
    }
}

/// The desktop build has no GPS; these settings drive the simulated device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocationSettings {
    pub permission: PermissionStatus,
    pub device_position: Option<Coordinates>,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            permission: PermissionStatus::Granted,
            device_position: Some(DEFAULT_CENTER),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BookingSettings {
    pub keep_pickup_on_dropoff_cancel: bool,
}

impl AppConfig {
    /// `RIDEOVER_CONFIG` if set, otherwise `rideover.json` in the working directory.
    pub fn default_path() -> PathBuf {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => PathBuf::from(CONFIG_FILE_NAME),
        }
    }

    /// Loads the file at `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default())
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: AppConfig =
            serde_json::from_str(&contents).map_err(|error| ConfigError::InvalidFormat {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?;

        if config.version != CONFIG_FILE_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                path: path.to_path_buf(),
                found: config.version,
            });
        }
        Ok(config)
    }

    /// Loads from [`AppConfig::default_path`] and applies env overrides.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let mut config = Self::load(&Self::default_path())?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env(IDENTITY_URL_ENV).filter(|value| !value.trim().is_empty()) {
            self.identity.url = Some(url);
        }
        if let Some(key) = env(IDENTITY_ANON_KEY_ENV).filter(|value| !value.trim().is_empty()) {
            self.identity.anon_key = Some(key);
        }
    }

    pub fn feature_flags(&self) -> FeatureFlags {
        FeatureFlags::from_env(&self.flags)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
