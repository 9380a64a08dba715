use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vellum_core::crypto::{Codec, KdfAlgorithm, KdfParams};
use vellum_core::rate_limit::RateLimitConfig;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VellumConfig {
    #[serde(default)]
    pub kdf: KdfSection,
    #[serde(default)]
    pub rate_limit: RateLimitSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfSection {
    pub algorithm: KdfAlgorithm,
    pub pbkdf2_iterations: u32,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSection {
    pub limit: usize,
    pub window_ms: u64,
    pub sweep_threshold: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for KdfSection {
    fn default() -> Self {
        let params = KdfParams::default();
        Self {
            algorithm: KdfAlgorithm::default(),
            pbkdf2_iterations: params.pbkdf2_iterations,
            argon2_memory_kib: params.argon2_memory_kib,
            argon2_iterations: params.argon2_iterations,
            argon2_parallelism: params.argon2_parallelism,
        }
    }
}

impl KdfSection {
    pub fn params(&self) -> KdfParams {
        KdfParams {
            pbkdf2_iterations: self.pbkdf2_iterations,
            argon2_memory_kib: self.argon2_memory_kib,
            argon2_iterations: self.argon2_iterations,
            argon2_parallelism: self.argon2_parallelism,
        }
    }

    /// Build a codec, optionally overriding the configured algorithm.
    pub fn codec(&self, algorithm: Option<KdfAlgorithm>) -> anyhow::Result<Codec> {
        let algorithm = algorithm.unwrap_or(self.algorithm);
        let params = self.params();
        params.validate(algorithm)?;
        Ok(Codec::new(algorithm, params))
    }
}

impl Default for RateLimitSection {
    fn default() -> Self {
        let config = RateLimitConfig::default();
        Self {
            limit: config.limit,
            window_ms: u64::try_from(config.window.as_millis()).unwrap_or(u64::MAX),
            sweep_threshold: config.sweep_threshold,
        }
    }
}

impl RateLimitSection {
    pub fn limiter_config(&self, limit: Option<usize>, window_ms: Option<u64>) -> RateLimitConfig {
        RateLimitConfig {
            limit: limit.unwrap_or(self.limit),
            window: Duration::from_millis(window_ms.unwrap_or(self.window_ms)),
            sweep_threshold: self.sweep_threshold,
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Resolve the config file path: explicit flag/env first, then XDG default.
pub fn resolve_config_path(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    default_config_path()
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

/// Load config from `path`, falling back to defaults when it does not exist.
pub fn load_config(path: &Path) -> anyhow::Result<VellumConfig> {
    if !path.exists() {
        return Ok(VellumConfig::default());
    }
    read_config(path)
}

pub fn read_config(path: &Path) -> anyhow::Result<VellumConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &VellumConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents = render_config(config)?;
    vellum_core::fs::write_atomic(path, contents.as_bytes())
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn render_config(config: &VellumConfig) -> anyhow::Result<String> {
    toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("vellum"));
        }
    }
    Ok(home_dir()?.join(".config").join("vellum"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
