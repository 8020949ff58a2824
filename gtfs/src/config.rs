use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::{Limits, TableLocator};

/// Overrides `data_dir`
pub const DATA_DIR_ENV: &str = "TRANSIT_DATA_DIR";

/// Where to find the GTFS files and how much of them to return. Any field missing from a config
/// file takes its default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tried first
    pub data_dir: PathBuf,
    /// Tried in order when a table isn't in `data_dir`. The defaults cover the container image
    /// and a local checkout.
    pub fallback_dirs: Vec<PathBuf>,
    pub stop_limit: usize,
    pub route_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/gtfs"),
            fallback_dirs: vec![
                PathBuf::from("/app/data/gtfs"),
                PathBuf::from("/data/gtfs"),
                PathBuf::from("../data/gtfs"),
            ],
            stop_limit: 500,
            route_limit: 50,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs_err::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            info!("{DATA_DIR_ENV} overrides data_dir");
            self.data_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn locator(&self) -> TableLocator {
        let mut dirs = vec![self.data_dir.clone()];
        dirs.extend(self.fallback_dirs.iter().cloned());
        TableLocator::new(dirs)
    }

    pub fn limits(&self) -> Limits {
        Limits {
            stops: self.stop_limit,
            routes: self.route_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn partial_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs_err::write(&path, r#"{"data_dir": "/srv/gtfs", "stop_limit": 20}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/gtfs"));
        assert_eq!(config.stop_limit, 20);
        assert_eq!(config.route_limit, 50);
        assert_eq!(config.fallback_dirs.len(), 3);
        assert_eq!(
            config.locator().candidates("stops")[0],
            PathBuf::from("/srv/gtfs/stops.txt")
        );
        assert_eq!(config.locator().dirs().len(), 4);
    }

    #[test]
    fn invalid_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs_err::write(&path, r#"{"stop_limit": "lots"}"#).unwrap();
        assert!(matches!(Config::load(&path), Err(Error::Config { .. })));
        assert!(matches!(
            Config::load(&dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));
    }
}
