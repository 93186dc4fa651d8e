use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::flickr::Size;

pub const APP_FOLDER: &str = "FlickrSearch";
pub const ENV_FILE: &str = ".env";
pub const CONFIG_FILE: &str = "config.json";

const ENV_TEMPLATE: &str = "# Flickr API key, see https://www.flickr.com/services/apps/create/\nFLICKR_API_KEY=\n";

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("Failed to read .env: {0}")]
    Env(#[from] dotenvy::Error),

    #[error("Malformed config.json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No configuration folder could be determined")]
    NoConfigFolder,

    #[error("Default configuration files have been created in {0}, set FLICKR_API_KEY before proceeding")]
    RequiresConfigure(PathBuf),
}

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where downloaded images are written.
    pub folder: PathBuf,
    pub size: Size,
    pub favourites: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let folder = dirs::picture_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_FOLDER);
        let favourites = default_config_folder()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("favourites.json");

        Self {
            folder,
            size: Size::Thumbnail,
            favourites,
        }
    }
}

pub fn default_config_folder() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_FOLDER))
}

/// Loads `.env` and `config.json` from `config_folder`, writing defaults for
/// whichever is missing.
pub fn configure<P: AsRef<Path>>(config_folder: P) -> Result<Config> {
    let config_folder = config_folder.as_ref();
    fs::create_dir_all(config_folder)?;

    let env_path = config_folder.join(ENV_FILE);
    let config_path = config_folder.join(CONFIG_FILE);
    let requires_config = !env_path.exists() || !config_path.exists();

    if requires_config {
        if !env_path.exists() {
            fs::write(&env_path, ENV_TEMPLATE)?;
        }

        if !config_path.exists() {
            let content = serde_json::to_string_pretty(&Config::default())?;
            fs::write(&config_path, content)?;
        }

        return Err(Error::RequiresConfigure(config_folder.to_path_buf()));
    }

    dotenvy::from_path(&env_path)?;

    let content = fs::read_to_string(&config_path)?;
    let config = serde_json::from_str(&content)?;
    debug!(?config, path = %config_path.display(), "loaded configuration");

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_run_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("app");

        let err = configure(&folder).unwrap_err();
        assert!(matches!(err, Error::RequiresConfigure(ref path) if path == &folder));

        let env = fs::read_to_string(folder.join(ENV_FILE)).unwrap();
        assert!(env.contains("FLICKR_API_KEY="));

        let written: Config =
            serde_json::from_str(&fs::read_to_string(folder.join(CONFIG_FILE)).unwrap()).unwrap();
        assert_eq!(written, Config::default());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(ENV_FILE), "FLICKR_SEARCH_TEST_VAR=1\n").unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "folder": "/tmp/photos", "size": "large" }"#,
        )
        .unwrap();

        let config = configure(dir.path()).unwrap();
        assert_eq!(config.folder, PathBuf::from("/tmp/photos"));
        assert_eq!(config.size, Size::Large);
        assert_eq!(config.favourites, Config::default().favourites);
    }

    #[test]
    fn malformed_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(ENV_FILE), "").unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{ nope").unwrap();

        assert!(matches!(configure(dir.path()), Err(Error::Json(_))));
    }
}
