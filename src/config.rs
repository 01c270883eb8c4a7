//! Transport configuration.
//!
//! Handles loading, validating, and merging `transport.toml`. Stock defaults
//! are the base layer; a user file overrides just the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! format = "jpeg"           # Codec for outgoing frames: jpeg, png or qoi
//!
//! [jpeg]
//! quality = 95              # 0-100 (0 is treated as 1)
//! progressive = false       # Progressive scans
//! optimize = false          # Optimized Huffman tables
//! restart_interval = 0      # MCUs between restart markers (0 = none)
//!
//! [png]
//! level = 9                 # Compression level 0-9
//!
//! [decode]
//! mode = "unchanged"        # gray, color or unchanged
//!
//! [processing]
//! max_processes = 4         # CLI batch workers (omit for auto = CPU cores)
//! ```
//!
//! An unrecognized `format` is not a load error. The transport keeps
//! running and fails each message with an unknown-codec error until the
//! configuration is fixed, matching how a live reconfiguration behaves.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the config directory.
pub const CONFIG_FILE: &str = "transport.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Transport configuration loaded from `transport.toml`.
///
/// Read once per message by the encoder and decoder, so a
/// [`reconfigure`](crate::Publisher::reconfigure) takes effect on the next
/// frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportConfig {
    /// Codec name for outgoing frames.
    pub format: String,
    pub jpeg: JpegConfig,
    pub png: PngConfig,
    pub decode: DecodeConfig,
    /// Parallel processing settings for the CLI.
    pub processing: ProcessingConfig,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            format: "jpeg".to_string(),
            jpeg: JpegConfig::default(),
            png: PngConfig::default(),
            decode: DecodeConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl TransportConfig {
    /// Default configuration with a different codec.
    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            ..Self::default()
        }
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jpeg.quality > 100 {
            return Err(ConfigError::Validation(
                "jpeg.quality must be 0-100".into(),
            ));
        }
        if self.jpeg.restart_interval > u32::from(u16::MAX) {
            return Err(ConfigError::Validation(
                "jpeg.restart_interval must be 0-65535".into(),
            ));
        }
        if self.png.level > 9 {
            return Err(ConfigError::Validation("png.level must be 0-9".into()));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// JPEG encoder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JpegConfig {
    pub quality: u32,
    pub progressive: bool,
    pub optimize: bool,
    pub restart_interval: u32,
}

impl Default for JpegConfig {
    fn default() -> Self {
        Self {
            quality: 95,
            progressive: false,
            optimize: false,
            restart_interval: 0,
        }
    }
}

/// PNG encoder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PngConfig {
    pub level: u32,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self { level: 9 }
    }
}

/// How JPEG, PNG and legacy payloads are decoded. QOI ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Collapse to a single 8-bit channel (`mono8`).
    Gray,
    /// Force three 8-bit channels.
    Color,
    /// Keep whatever the stream holds, then restore the original layout.
    #[default]
    Unchanged,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeConfig {
    pub mode: DecodeMode,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel encode workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(TransportConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `transport.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist, `Err` if it exists but
/// is not valid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<TransportConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: TransportConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `transport.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<TransportConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `transport.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Compressed Transport Configuration
# ==================================
# All options are optional. Values shown are the defaults.
# Unknown keys are rejected.

# Codec used for outgoing frames: "jpeg", "png" or "qoi".
# Color frames are converted to the layout the codec expects
# (BGR for jpeg/png, RGB/RGBA for qoi) and the payload header
# records the conversion so receivers can undo it.
format = "jpeg"

# ---------------------------------------------------------------------------
# JPEG encoder
# ---------------------------------------------------------------------------
[jpeg]
# Quality 0-100 (0 acts as 1). Higher is larger and closer to the original.
quality = 95
# Progressive scans instead of a single baseline scan.
progressive = false
# Compute optimal Huffman tables (smaller output, slower encode).
optimize = false
# MCUs between restart markers. 0 disables them (max 65535).
restart_interval = 0

# ---------------------------------------------------------------------------
# PNG encoder
# ---------------------------------------------------------------------------
[png]
# Compression level 0-9. 0-3 fast, 4-6 default, 7-9 best.
level = 9

# ---------------------------------------------------------------------------
# Decoding
# ---------------------------------------------------------------------------
[decode]
# "unchanged": deliver frames in their original encoding.
# "gray":      collapse jpeg/png/legacy payloads to mono8.
# "color":     force jpeg/png/legacy payloads to three 8-bit channels
#              (rgb8 for red-first originals, bgr8 otherwise).
# QOI payloads always decode unchanged.
mode = "unchanged"

# ---------------------------------------------------------------------------
# Parallel processing (CLI)
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel encode workers. Omit for auto (= CPU cores).
# Values above the core count are clamped down.
# max_processes = 4
"##
}
