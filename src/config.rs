/// Application settings
///
/// Settings are read from `gredit.toml` in the working directory, or from
/// the user's config directory:
/// - Linux: ~/.config/gredit/gredit.toml
/// - macOS: ~/Library/Application Support/gredit/gredit.toml
/// - Windows: %APPDATA%\gredit\gredit.toml
///
/// Every field is optional; missing ones take the defaults below.
use crate::error::{GreditError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "gredit.toml";
const APP_NAME: &str = "gredit";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the database, schema and font
    pub data_dir: PathBuf,
    /// Database file name, relative to `data_dir` unless absolute
    pub database_file: PathBuf,
    /// SQL schema executed when the database is prepared
    pub schema_file: PathBuf,
    pub font_file: PathBuf,
    pub font_size: f32,
    /// Folder browsed on start-up
    pub image_folder: PathBuf,
    /// Maximum number of search hits shown
    pub search_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./Data"),
            database_file: PathBuf::from("database.db"),
            schema_file: PathBuf::from("schema.sql"),
            font_file: PathBuf::from("Quantico-Regular.ttf"),
            font_size: 20.0,
            image_folder: PathBuf::from("./test/"),
            search_limit: 200,
        }
    }
}

impl Settings {
    /// Load settings from the first config file found, falling back to defaults.
    pub fn load() -> Self {
        for path in Self::candidate_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load_from_path(&path) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => {
                    log::error!("{}, using defaults", e);
                    return Self::default();
                }
            }
        }
        Self::default()
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| GreditError::io(path, e))?;
        toml::from_str(&content).map_err(|e| GreditError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(mut path) = dirs::config_dir() {
            path.push(APP_NAME);
            path.push(CONFIG_FILE);
            paths.push(path);
        }
        paths
    }

    pub fn database_path(&self) -> PathBuf {
        self.in_data_dir(&self.database_file)
    }

    pub fn schema_path(&self) -> PathBuf {
        self.in_data_dir(&self.schema_file)
    }

    pub fn font_path(&self) -> PathBuf {
        self.in_data_dir(&self.font_file)
    }

    fn in_data_dir(&self, name: &Path) -> PathBuf {
        if name.is_absolute() {
            name.to_path_buf()
        } else {
            self.data_dir.join(name)
        }
    }
}
