use log::warn;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use std::{fs, path::Path};

pub mod session;
pub mod sync;

pub use session::SessionConfig;
pub use sync::SyncConfig;

const CONFIG_ROOT_FOLDER: &str = "config/";

/// Settings for menu sessions, shared by every menu a server opens.
///
/// The defaults keep menus deny-by-default and resend whole contents only when a large part of
/// the client view went stale.
#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MenuConfig {
    pub sync: SyncConfig,
    pub session: SessionConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Couldn't parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Couldn't serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub trait LoadConfiguration {
    fn load(exec_dir: &Path) -> Result<Self, ConfigError>
    where
        Self: Sized + Default + Serialize + DeserializeOwned,
    {
        let config_dir = exec_dir.join(CONFIG_ROOT_FOLDER);
        if !config_dir.exists() {
            log::debug!("creating new config root folder");
            fs::create_dir(&config_dir)?;
        }
        let path = config_dir.join(Self::get_path());

        let config = if path.exists() {
            let file_content = fs::read_to_string(&path)?;
            toml::from_str(&file_content)?
        } else {
            let content = Self::default();

            if let Err(err) = fs::write(&path, toml::to_string(&content)?) {
                warn!(
                    "Couldn't write default config to {:?}. Reason: {}. Using the defaults for now",
                    &path, err
                );
            }

            content
        };

        config.validate()?;
        Ok(config)
    }

    fn get_path() -> &'static Path;

    fn validate(&self) -> Result<(), ConfigError>;
}

impl LoadConfiguration for MenuConfig {
    fn get_path() -> &'static Path {
        Path::new("menu.toml")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.sync.validate()?;
        self.session.validate()
    }
}
