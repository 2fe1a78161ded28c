use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::models::{ModelScopeEndpoint, DEFAULT_HOST, DEFAULT_USER};

const CONFIG_FILE: &str = "config.json";
const CATALOG_FILE: &str = "models.json";
const DEFAULT_STORAGE_DIR: &str = "../quantized";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub catalog_path: Option<PathBuf>,
    pub storage_dir: PathBuf,
    pub legacy_storage_dir: PathBuf,
    pub host: String,
    pub user: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_path: None,
            storage_dir: DEFAULT_STORAGE_DIR.into(),
            legacy_storage_dir: DEFAULT_STORAGE_DIR.into(),
            host: DEFAULT_HOST.into(),
            user: DEFAULT_USER.into(),
        }
    }
}

impl Settings {
    /// Reads `config.json` from the platform config directory, falling back
    /// to defaults when it does not exist.
    pub fn load() -> Result<Self> {
        match resolve_config_path() {
            Some(path) => load_settings(&path),
            None => Ok(Self::default()),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> ModelScopeEndpoint {
        ModelScopeEndpoint {
            host: self.host.clone(),
            user: self.user.clone(),
        }
    }

    /// The configured catalog, or `models.json` beside the executable.
    pub fn catalog_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.catalog_path {
            return Ok(path.clone());
        }
        let exe = env::current_exe().context("locate executable")?;
        let dir = exe
            .parent()
            .with_context(|| format!("{} has no parent directory", exe.display()))?;
        Ok(dir.join(CATALOG_FILE))
    }
}

fn resolve_config_path() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "ModelFetch", "ModelFetch")?;
    Some(project_dirs.config_dir().join(CONFIG_FILE))
}

pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let bytes = fs::read(path).with_context(|| format!("failed reading {path:?}"))?;
    serde_json::from_slice(&bytes).context("config json could not be parsed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.storage_dir, PathBuf::from("../quantized"));
        assert_eq!(settings.endpoint(), ModelScopeEndpoint::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"{ "storageDir": "/srv/models", "catalogPath": "/etc/models.json", "user": "mirror" }"#,
        )
        .unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.storage_dir, PathBuf::from("/srv/models"));
        assert_eq!(settings.legacy_storage_dir, PathBuf::from("../quantized"));
        assert_eq!(settings.catalog_path().unwrap(), PathBuf::from("/etc/models.json"));
        assert_eq!(settings.endpoint().host, "modelscope.cn");
        assert_eq!(settings.endpoint().user, "mirror");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{ storageDir: ").unwrap();
        assert!(load_settings(&path).is_err());
    }

    #[test]
    fn catalog_defaults_to_executable_directory() {
        let path = Settings::default().catalog_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "models.json");
    }
}
