use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::layout::{DEFAULT_CONTAINER_WIDTH, MIN_CONTAINER_WIDTH};
use crate::raster::DEFAULT_FONT_FAMILY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "codeshot";
const APP_CONFIG_FILE: &str = "config.json";

/// Application-level settings from `config.json`. Style settings are not
/// persisted; every session starts from `StyleConfig::default()`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub export_dir: Option<PathBuf>,
    pub font_family: String,
    pub container_width: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            export_dir: None,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            container_width: DEFAULT_CONTAINER_WIDTH,
        }
    }
}

impl AppConfig {
    fn normalized(mut self) -> Self {
        if self.font_family.trim().is_empty() {
            self.font_family = DEFAULT_FONT_FAMILY.to_string();
        }
        if self.container_width < MIN_CONTAINER_WIDTH {
            tracing::warn!(
                container_width = self.container_width,
                minimum = MIN_CONTAINER_WIDTH,
                "container width too small; clamping"
            );
            self.container_width = MIN_CONTAINER_WIDTH;
        }
        self
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str::<AppConfig>(&contents)
            .map(AppConfig::normalized)
            .unwrap_or_else(|err| {
                tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
                AppConfig::default()
            }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
