use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default upload cap for audit PDFs, in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: u32 = 10;
/// Default listen address of the web server.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5001";

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub server: Option<ServerConfig>,
    pub catalog: Option<CatalogConfig>,
    pub parsing: Option<ParsingConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: Option<String>,
    pub max_upload_mb: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Extra regexes for lines to skip, added to the built-in ones.
    pub extra_ignore_patterns: Option<Vec<String>>,
    pub track_planned_and_needed: Option<bool>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind_addr: String,
    pub max_upload_mb: u32,
    pub db_path: Option<PathBuf>,
    pub extra_ignore_patterns: Vec<String>,
    pub track_planned_and_needed: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
            db_path: None,
            extra_ignore_patterns: Vec::new(),
            track_planned_and_needed: false,
        }
    }
}

impl Settings {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb as usize * 1024 * 1024
    }
}

/// Platform config directory path: `<config_dir>/coursescope/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("coursescope").join("config.toml"))
}

/// Load config by cascading CWD `.coursescope.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".coursescope.toml"));

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
        server: Some(ServerConfig {
            bind_addr: overlay
                .server
                .as_ref()
                .and_then(|s| s.bind_addr.clone())
                .or_else(|| base.server.as_ref().and_then(|s| s.bind_addr.clone())),
            max_upload_mb: overlay
                .server
                .as_ref()
                .and_then(|s| s.max_upload_mb)
                .or_else(|| base.server.as_ref().and_then(|s| s.max_upload_mb)),
        }),
        catalog: Some(CatalogConfig {
            db_path: overlay
                .catalog
                .as_ref()
                .and_then(|c| c.db_path.clone())
                .or_else(|| base.catalog.as_ref().and_then(|c| c.db_path.clone())),
        }),
        parsing: Some(ParsingConfig {
            extra_ignore_patterns: overlay
                .parsing
                .as_ref()
                .and_then(|p| p.extra_ignore_patterns.clone())
                .or_else(|| {
                    base.parsing
                        .as_ref()
                        .and_then(|p| p.extra_ignore_patterns.clone())
                }),
            track_planned_and_needed: overlay
                .parsing
                .as_ref()
                .and_then(|p| p.track_planned_and_needed)
                .or_else(|| {
                    base.parsing
                        .as_ref()
                        .and_then(|p| p.track_planned_and_needed)
                }),
        }),
    }
}

/// Resolve settings: environment variables > config file > defaults.
///
/// Reads `COURSESCOPE_BIND`, `COURSESCOPE_MAX_UPLOAD_MB` and `COURSESCOPE_DB`.
pub fn resolve(file: &ConfigFile) -> Settings {
    resolve_with_env(file, |key| std::env::var(key).ok())
}

/// [`resolve`] with an injectable environment lookup.
pub fn resolve_with_env(file: &ConfigFile, env: impl Fn(&str) -> Option<String>) -> Settings {
    let defaults = Settings::default();
    let server = file.server.clone().unwrap_or_default();
    let catalog = file.catalog.clone().unwrap_or_default();
    let parsing = file.parsing.clone().unwrap_or_default();

    let max_upload_mb = env("COURSESCOPE_MAX_UPLOAD_MB")
        .and_then(|v| v.parse().ok())
        .or(server.max_upload_mb)
        .unwrap_or(defaults.max_upload_mb);

    Settings {
        bind_addr: env("COURSESCOPE_BIND")
            .or(server.bind_addr)
            .unwrap_or(defaults.bind_addr),
        max_upload_mb,
        db_path: env("COURSESCOPE_DB")
            .or(catalog.db_path)
            .map(PathBuf::from),
        extra_ignore_patterns: parsing.extra_ignore_patterns.unwrap_or_default(),
        track_planned_and_needed: parsing
            .track_planned_and_needed
            .unwrap_or(defaults.track_planned_and_needed),
    }
}
