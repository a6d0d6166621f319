use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

const DEFAULT_USER: &str = "local";

pub struct Config {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    /// Owner of every record this process reads or writes.
    pub user_id: String,
}

impl Config {
    /// `MEALPLAN_DATA_DIR` overrides the platform data directory and
    /// `MEALPLAN_USER` selects the user (default `local`).
    pub fn load() -> Result<Self> {
        let data_dir = if let Some(dir) = std::env::var_os("MEALPLAN_DATA_DIR") {
            PathBuf::from(dir)
        } else {
            ProjectDirs::from("", "", "mealplan")
                .context("Could not determine home directory")?
                .data_dir()
                .to_path_buf()
        };

        let user_id = std::env::var("MEALPLAN_USER")
            .ok()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_USER.to_string());

        Self::from_data_dir(data_dir, user_id)
    }

    fn from_data_dir(data_dir: PathBuf, user_id: String) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("mealplan.db");

        Ok(Config {
            db_path,
            data_dir,
            user_id,
        })
    }

    /// Load the API key from disk, or generate a new one.
    ///
    /// Returns `(key, newly_created)` where `newly_created` is true when a
    /// fresh key was just generated (first run).
    pub fn load_or_create_api_key(&self) -> Result<(String, bool)> {
        use rand::Rng;
        use std::fmt::Write;

        let path = self.data_dir.join("api_key");

        if path.exists() {
            let key = std::fs::read_to_string(&path).context("Failed to read API key file")?;
            let key = key.trim().to_string();
            if !key.is_empty() {
                return Ok((key, false));
            }
        }

        let bytes: [u8; 32] = rand::rng().random();
        let key = bytes
            .iter()
            .fold(String::with_capacity(64), |mut acc: String, b| {
                let _ = write!(acc, "{b:02x}");
                acc
            });
        std::fs::write(&path, &key).context("Failed to write API key file")?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .context("Failed to set API key file permissions")?;
        }
        tracing::info!(path = %path.display(), "generated new API key");
        Ok((key, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_data_dir_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("mealplan");
        let config = Config::from_data_dir(dir.clone(), "alice".to_string()).unwrap();
        assert!(dir.is_dir());
        assert_eq!(config.db_path, dir.join("mealplan.db"));
        assert_eq!(config.user_id, "alice");
    }

    #[test]
    fn test_api_key_is_created_once() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::from_data_dir(tmp.path().to_path_buf(), "local".to_string()).unwrap();

        let (key, created) = config.load_or_create_api_key().unwrap();
        assert!(created);
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));

        let (again, created) = config.load_or_create_api_key().unwrap();
        assert!(!created);
        assert_eq!(again, key);
    }

    #[test]
    fn test_blank_api_key_file_is_regenerated() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::from_data_dir(tmp.path().to_path_buf(), "local".to_string()).unwrap();
        std::fs::write(tmp.path().join("api_key"), "  \n").unwrap();

        let (key, created) = config.load_or_create_api_key().unwrap();
        assert!(created);
        assert_eq!(key.len(), 64);
    }

    #[cfg(unix)]
    #[test]
    fn test_api_key_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let config = Config::from_data_dir(tmp.path().to_path_buf(), "local".to_string()).unwrap();
        config.load_or_create_api_key().unwrap();

        let mode = std::fs::metadata(tmp.path().join("api_key"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
