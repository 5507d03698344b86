//! Where album settings come from.
//!
//! Two files are read, the second winning on every section it sets: the
//! per-user `config.toml` in [`config_dir`], then `album.toml` in the working
//! directory. Flags given to `album start` are folded in afterwards by the
//! binary.

use std::path::{Path, PathBuf};

use crate::{AlbumConfig, ConfigError, Result};

const PROJECT_FILE: &str = "album.toml";
const USER_FILE: &str = "config.toml";

/// Overrides the per-user directory; an empty value is ignored.
const CONFIG_DIR_ENV: &str = "ALBUM_CONFIG_DIR";

/// One file that was considered.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub path: PathBuf,
    /// False when the file was absent or could not be used.
    pub loaded: bool,
}

/// Merged settings plus a record of how they were assembled.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AlbumConfig,
    /// Every file considered, lowest precedence first.
    pub sources: Vec<ConfigSource>,
    /// One line per file that existed but was skipped.
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Merge the per-user file and `./album.toml`.
    ///
    /// Never fails: a broken file becomes a warning and defaults fill in.
    pub fn discover() -> Self {
        Self::discover_in(config_dir().as_deref(), Path::new(PROJECT_FILE))
    }

    fn discover_in(user_dir: Option<&Path>, project_file: &Path) -> Self {
        let mut loaded = Self {
            config: AlbumConfig::new(),
            sources: Vec::new(),
            warnings: Vec::new(),
        };
        if let Some(dir) = user_dir {
            loaded.add_layer(dir.join(USER_FILE));
        }
        loaded.add_layer(project_file.to_path_buf());
        loaded
    }

    /// Use exactly one file; unlike discovery, a missing or broken file is an error.
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self {
            config: read_file(path)?,
            sources: vec![ConfigSource {
                path: path.to_path_buf(),
                loaded: true,
            }],
            warnings: Vec::new(),
        })
    }

    /// Paths whose contents made it into [`config`](Self::config).
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter_map(|s| s.loaded.then_some(s.path.as_path()))
            .collect()
    }

    fn add_layer(&mut self, path: PathBuf) {
        let loaded = path.is_file()
            && match read_file(&path) {
                Ok(layer) => {
                    self.config.merge(layer);
                    true
                }
                Err(e) => {
                    self.warnings.push(format!("Skipped {}: {}", path.display(), e));
                    false
                }
            };
        self.sources.push(ConfigSource { path, loaded });
    }
}

/// Parse one TOML file.
pub fn read_file(path: &Path) -> Result<AlbumConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    AlbumConfig::from_toml(&text)
}

/// Per-user directory for `config.toml` and the log files.
///
/// `ALBUM_CONFIG_DIR` when set, else `album` under the platform config dir.
pub fn config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|d| d.join("album")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project_file(dir: &TempDir) -> PathBuf {
        dir.path().join(PROJECT_FILE)
    }

    #[test]
    fn test_read_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server]\nport = 8081\n").unwrap();

        assert_eq!(read_file(&path).unwrap().server().port, 8081);
    }

    #[test]
    fn test_read_file_errors() {
        let missing = read_file(Path::new("/nonexistent/album.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::ReadFile { .. }));

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "this is not valid toml {{{{").unwrap();
        assert!(matches!(read_file(&path).unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_nothing_to_discover() {
        let user = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();

        let loaded = LoadedConfig::discover_in(Some(user.path()), &project_file(&project));
        assert!(loaded.config.server.is_none());
        assert!(loaded.loaded_from().is_empty());
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.sources.len(), 2);
    }

    #[test]
    fn test_project_file_wins_per_section() {
        let user = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        fs::write(
            user.path().join(USER_FILE),
            "[server]\nport = 8080\n\n[auth]\npassword = \"from-user\"\n",
        )
        .unwrap();
        fs::write(project_file(&project), "[server]\nport = 3000\n").unwrap();

        let loaded = LoadedConfig::discover_in(Some(user.path()), &project_file(&project));

        assert_eq!(loaded.config.server().port, 3000);
        assert_eq!(loaded.config.auth().password.as_deref(), Some("from-user"));
        assert_eq!(loaded.loaded_from().len(), 2);
    }

    #[test]
    fn test_without_user_dir_only_project_is_considered() {
        let project = TempDir::new().unwrap();
        fs::write(project_file(&project), "[session]\nmax_idle_secs = 30\n").unwrap();

        let loaded = LoadedConfig::discover_in(None, &project_file(&project));
        assert_eq!(loaded.sources.len(), 1);
        assert_eq!(loaded.config.session().max_idle_secs, 30);
    }

    #[test]
    fn test_broken_file_is_skipped_with_warning() {
        let user = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        fs::write(project_file(&project), "not valid toml {{{{").unwrap();

        let loaded = LoadedConfig::discover_in(Some(user.path()), &project_file(&project));
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].starts_with("Skipped"));
        assert!(loaded.loaded_from().is_empty());
    }

    #[test]
    fn test_from_file_tracks_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[session]\nmax_idle_secs = 60\n").unwrap();

        let loaded = LoadedConfig::from_file(&path).unwrap();
        assert_eq!(loaded.config.session().max_idle_secs, 60);
        assert_eq!(loaded.loaded_from(), vec![path.as_path()]);
    }
}
