use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable that overrides the application directory.
pub const HOME_ENV: &str = "PROJDL_HOME";

const APP_DIR_NAME: &str = ".projdl";

pub fn user_home() -> Option<PathBuf> { home::home_dir() }

/// `$PROJDL_HOME`, or `~/.projdl` when unset.
pub fn app_dir() -> Result<PathBuf> {
    app_dir_from(env::var_os(HOME_ENV).map(PathBuf::from), user_home())
}

fn app_dir_from(override_dir: Option<PathBuf>, home: Option<PathBuf>) -> Result<PathBuf> {
    match override_dir.filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => Ok(dir),
        None => home.map(|h| h.join(APP_DIR_NAME)).ok_or(Error::NoHome),
    }
}

/// Well-known files under the application directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub root: PathBuf,
}

impl AppPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    pub fn discover() -> Result<Self> { app_dir().map(Self::new) }

    pub fn config_file(&self) -> PathBuf { self.root.join("config.toml") }

    pub fn catalog_file(&self) -> PathBuf { self.root.join("projects.json") }

    pub fn audit_log(&self) -> PathBuf { self.root.join("downloads.log") }

    pub fn validation_cache(&self) -> PathBuf { self.root.join("validate_cache.json") }

    pub fn downloads(&self) -> PathBuf { self.root.join("downloads") }

    pub fn root(&self) -> &Path { &self.root }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let dir = app_dir_from(Some("/srv/projdl".into()), Some("/home/u".into())).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/projdl"));
    }

    #[test]
    fn test_empty_override_falls_back_to_home() {
        let dir = app_dir_from(Some(PathBuf::new()), Some("/home/u".into())).unwrap();
        assert_eq!(dir, PathBuf::from("/home/u/.projdl"));
    }

    #[test]
    fn test_no_home_is_error() {
        assert!(matches!(app_dir_from(None, None), Err(Error::NoHome)));
    }

    #[test]
    fn test_app_paths_layout() {
        let paths = AppPaths::new("/data");
        assert_eq!(paths.config_file(), PathBuf::from("/data/config.toml"));
        assert_eq!(paths.downloads(), PathBuf::from("/data/downloads"));
        assert_eq!(paths.validation_cache(), PathBuf::from("/data/validate_cache.json"));
    }
}
