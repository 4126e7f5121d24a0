//! Configuration loading for the vidthumb binary.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.vidthumb/config.toml` (user)
//! 3. `/etc/vidthumb/config.toml` (system)
//!
//! With no file present, every setting takes its library default.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::DEFAULT_MAX_BYTES;
use crate::{Result, ThumbnailError, Vidthumb, VidthumbBuilder};

const MIB: u64 = 1024 * 1024;

/// Binary configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub decoder: DecoderSection,
    #[serde(default)]
    pub worker: WorkerSection,
}

/// `[cache]` settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Entry directory (default: platform cache dir + `vidthumb/thumbnails`).
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Soft budget in megabytes (default: 100).
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,
    #[serde(default)]
    pub verify_on_lookup: bool,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            dir: None,
            max_size_mb: default_max_size_mb(),
            verify_on_lookup: false,
        }
    }
}

fn default_max_size_mb() -> u64 {
    DEFAULT_MAX_BYTES / MIB
}

/// `[decoder]` settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecoderSection {
    /// ffmpeg binary (default: `ffmpeg` from `PATH`).
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
    /// Abort decodes after this many seconds (default: no limit).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// `[worker]` settings.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSection {
    /// Requests processed at once (default: 1).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for WorkerSection {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> usize {
    1
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided, must exist)
    /// 2. `~/.vidthumb/config.toml`
    /// 3. `/etc/vidthumb/config.toml`
    /// 4. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Config::default()),
        }
    }

    /// Parse one config file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ThumbnailError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            ThumbnailError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(ThumbnailError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".vidthumb").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/vidthumb/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Budget in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.cache.max_size_mb.saturating_mul(MIB)
    }

    /// A service builder carrying every configured setting.
    pub fn builder(&self) -> VidthumbBuilder {
        let mut builder = Vidthumb::builder()
            .max_bytes(self.max_bytes())
            .verify_on_lookup(self.cache.verify_on_lookup)
            .worker_concurrency(self.worker.concurrency);

        if let Some(ref dir) = self.cache.dir {
            builder = builder.cache_dir(dir);
        }
        if let Some(ref ffmpeg) = self.decoder.ffmpeg_path {
            builder = builder.ffmpeg_path(ffmpeg);
        }
        if let Some(secs) = self.decoder.timeout_secs {
            builder = builder.decode_timeout(Duration::from_secs(secs));
        }
        builder
    }
}
