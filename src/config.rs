/// Application configuration
///
/// Read from a TOML file, then overridden from the environment.
/// Every field has a default, so no file at all is a valid config.

use crate::catalog::{Catalog, Latency};
use crate::error::{Result, TryOnError};
use crate::session::{FacingMode, MediaConstraints, SessionSettings, DEFAULT_DETECTION_INTERVAL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_QUERY_LATENCY_MS: u64 = 500;
const DEFAULT_LOOKUP_LATENCY_MS: u64 = 300;
const DEFAULT_RECOMMEND_LATENCY_MS: u64 = 400;
const DEFAULT_CAMERA_WIDTH: u32 = 1280;
const DEFAULT_CAMERA_HEIGHT: u32 = 720;

pub const CONFIG_ENV: &str = "TRYON_CONFIG";
pub const ADDR_ENV: &str = "TRYON_ADDR";

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    server: Option<ServerFile>,
    catalog: Option<CatalogFile>,
    session: Option<SessionFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ServerFile {
    addr: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    query_latency_ms: Option<u64>,
    lookup_latency_ms: Option<u64>,
    recommend_latency_ms: Option<u64>,
}

// Selection size, recommendation count and detection period are fixed,
// so they have no keys here and unknown keys are rejected.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SessionFile {
    camera_width: Option<u32>,
    camera_height: Option<u32>,
    facing_mode: Option<FacingMode>,
    audio: Option<bool>,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub catalog: CatalogSettings,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerSettings {
    pub addr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSettings {
    pub query_latency_ms: u64,
    pub lookup_latency_ms: u64,
    pub recommend_latency_ms: u64,
}

impl CatalogSettings {
    pub fn latency(&self) -> Latency {
        Latency {
            query: Duration::from_millis(self.query_latency_ms),
            lookup: Duration::from_millis(self.lookup_latency_ms),
            recommend: Duration::from_millis(self.recommend_latency_ms),
        }
    }

    /// Fixture catalog with these latencies
    pub fn build(&self) -> Result<Catalog> {
        Catalog::with_fixtures(self.latency())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionConfig {
    pub camera_width: u32,
    pub camera_height: u32,
    pub facing_mode: FacingMode,
    pub audio: bool,
}

impl SessionConfig {
    pub fn settings(&self) -> SessionSettings {
        SessionSettings {
            detection_interval: DEFAULT_DETECTION_INTERVAL,
            constraints: MediaConstraints {
                width: self.camera_width,
                height: self.camera_height,
                facing_mode: self.facing_mode,
                audio: self.audio,
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        // An empty file resolves to every default
        Self::from_file(ConfigFile::default())
    }
}

impl AppConfig {
    /// Load config
    ///
    /// Looks at `path`, then `$TRYON_CONFIG`, then `<config dir>/virtual-tryon/config.toml`.
    /// A missing default file is fine; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));

        let file = match explicit {
            Some(path) => read_config_file(&path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => read_config_file(&path)?,
                _ => ConfigFile::default(),
            },
        };

        let mut cfg = Self::from_file(file);
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse TOML text directly, no env overrides
    pub fn from_toml(raw: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(raw)?;
        let cfg = Self::from_file(file);
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: ConfigFile) -> Self {
        let server = file.server.unwrap_or_default();
        let catalog = file.catalog.unwrap_or_default();
        let session = file.session.unwrap_or_default();

        Self {
            server: ServerSettings {
                addr: server.addr.unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            },
            catalog: CatalogSettings {
                query_latency_ms: catalog.query_latency_ms.unwrap_or(DEFAULT_QUERY_LATENCY_MS),
                lookup_latency_ms: catalog
                    .lookup_latency_ms
                    .unwrap_or(DEFAULT_LOOKUP_LATENCY_MS),
                recommend_latency_ms: catalog
                    .recommend_latency_ms
                    .unwrap_or(DEFAULT_RECOMMEND_LATENCY_MS),
            },
            session: SessionConfig {
                camera_width: session.camera_width.unwrap_or(DEFAULT_CAMERA_WIDTH),
                camera_height: session.camera_height.unwrap_or(DEFAULT_CAMERA_HEIGHT),
                facing_mode: session.facing_mode.unwrap_or(FacingMode::User),
                audio: session.audio.unwrap_or(true),
            },
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(addr) = std::env::var(ADDR_ENV) {
            if !addr.trim().is_empty() {
                self.server.addr = addr.trim().to_string();
            }
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.server.addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(TryOnError::Config(format!(
                "server address '{}' is not host:port",
                self.server.addr
            )));
        }
        if self.session.camera_width == 0 || self.session.camera_height == 0 {
            return Err(TryOnError::Config(
                "camera resolution must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// `<config dir>/virtual-tryon/config.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("virtual-tryon").join("config.toml"))
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        TryOnError::Config(format!("failed to read config file {}: {}", path.display(), e))
    })?;
    let file = toml::from_str(&raw)?;
    log::debug!("loaded config from {}", path.display());
    Ok(file)
}
