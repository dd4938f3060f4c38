use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub translator: Option<TranslatorConfig>,
    pub server: Option<ServerConfig>,
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslatorConfig {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_chars: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub max_upload_mb: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    pub temp_dir: Option<String>,
}

/// Platform config directory path: `<config_dir>/doctrans/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("doctrans").join("config.toml"))
}

/// Load config by cascading CWD `.doctrans.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".doctrans.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        translator: Some(TranslatorConfig {
            endpoint: overlay
                .translator
                .as_ref()
                .and_then(|t| t.endpoint.clone())
                .or_else(|| base.translator.as_ref().and_then(|t| t.endpoint.clone())),
            timeout_secs: overlay
                .translator
                .as_ref()
                .and_then(|t| t.timeout_secs)
                .or_else(|| base.translator.as_ref().and_then(|t| t.timeout_secs)),
            max_chars: overlay
                .translator
                .as_ref()
                .and_then(|t| t.max_chars)
                .or_else(|| base.translator.as_ref().and_then(|t| t.max_chars)),
        }),
        server: Some(ServerConfig {
            bind: overlay
                .server
                .as_ref()
                .and_then(|s| s.bind.clone())
                .or_else(|| base.server.as_ref().and_then(|s| s.bind.clone())),
            max_upload_mb: overlay
                .server
                .as_ref()
                .and_then(|s| s.max_upload_mb)
                .or_else(|| base.server.as_ref().and_then(|s| s.max_upload_mb)),
        }),
        storage: Some(StorageConfig {
            temp_dir: overlay
                .storage
                .as_ref()
                .and_then(|s| s.temp_dir.clone())
                .or_else(|| base.storage.as_ref().and_then(|s| s.temp_dir.clone())),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_wins_field_by_field() {
        let base: ConfigFile = toml::from_str(
            r#"
            [translator]
            endpoint = "http://base/translate"
            timeout_secs = 10

            [server]
            bind = "127.0.0.1:8000"
            "#,
        )
        .unwrap();
        let overlay: ConfigFile = toml::from_str(
            r#"
            [translator]
            timeout_secs = 60

            [storage]
            temp_dir = "/tmp/uploads"
            "#,
        )
        .unwrap();

        let merged = merge(base, overlay);
        let translator = merged.translator.unwrap();
        assert_eq!(translator.endpoint.as_deref(), Some("http://base/translate"));
        assert_eq!(translator.timeout_secs, Some(60));
        assert_eq!(translator.max_chars, None);
        assert_eq!(merged.server.unwrap().bind.as_deref(), Some("127.0.0.1:8000"));
        assert_eq!(
            merged.storage.unwrap().temp_dir.as_deref(),
            Some("/tmp/uploads")
        );
    }

    #[test]
    fn missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("absent.toml")).is_none());
    }

    #[test]
    fn invalid_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[translator\nendpoint = ").unwrap();
        assert!(load_from_path(&path).is_none());
    }

    #[test]
    fn valid_file_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nmax_upload_mb = 8\n").unwrap();

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.server.unwrap().max_upload_mb, Some(8));
        assert!(config.translator.is_none());
    }
}
