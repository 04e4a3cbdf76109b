use anyhow::Result;
use std::path::PathBuf;

/// Override for the configuration directory (useful in containers and tests)
pub const BASE_PATH_ENV: &str = "SERIALIZD_WATCHED_BASE_PATH";

pub struct PathManager {
    config_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("serializd-watched");

        Ok(Self::with_base(base_dir))
    }

    pub fn with_base(base_dir: PathBuf) -> Self {
        Self { config_dir: base_dir }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }
}

impl Default for PathManager {
    fn default() -> Self {
        if let Ok(base) = std::env::var(BASE_PATH_ENV) {
            return Self::with_base(PathBuf::from(base));
        }

        // Platform-specific paths (e.g., ~/.config/serializd-watched on Linux)
        Self::new().unwrap_or_else(|_| Self::with_base(PathBuf::from(".serializd-watched")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_in_base_dir() {
        let paths = PathManager::with_base(PathBuf::from("/tmp/sw"));
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/sw/config.toml"));
    }
}
