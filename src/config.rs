use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pipeline::OutputFormat;

/// Top-level configuration for the exporter.
///
/// Holds the defaults an export falls back to when the caller does not
/// override them (the CLI flags, for example).
///
/// # Loading
///
/// ```rust,no_run
/// use meta_export::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.output.dir = "./exports".into();
/// config.output.number_padding = 3;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where and how exported files are written.
    pub output: OutputConfig,
}

/// Output naming and encoding defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Target directory. Empty means "not configured".
    pub dir: String,
    /// Filename prefix.
    pub prefix: String,
    /// Container format.
    pub format: OutputFormat,
    /// 1–100; PNG maps it to compression effort, JPEG uses it as quality.
    pub quality: u8,
    /// Zero-padding width of the sequence number (0–10).
    pub number_padding: usize,
    /// Replace files that already exist instead of skipping them.
    pub overwrite_existing: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: String::new(),
            prefix: "image".to_string(),
            format: OutputFormat::Png,
            quality: 95,
            number_padding: 5,
            overwrite_existing: false,
        }
    }
}

impl Config {
    /// Resolve the config file path — same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }
}

/// Optional encoders present in this build, resolved once at startup.
///
/// Pass the result into [`Exporter::new`](crate::pipeline::Exporter::new);
/// nothing re-probes it per image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// EXIF descriptor encoder for JPEG/WebP (cargo feature `exif`).
    pub exif_encoder: bool,
}

impl Capabilities {
    pub fn detect() -> Self {
        let caps = Self {
            exif_encoder: cfg!(feature = "exif"),
        };
        if !caps.exif_encoder {
            log::warn!("Built without the `exif` feature; JPEG/WebP exports will carry no metadata");
        }
        caps
    }

    /// Formats that can be selected as export targets.
    ///
    /// All of them have an image codec; the EXIF-family ones lose their
    /// metadata when [`exif_encoder`](Self::exif_encoder) is off.
    pub fn available_formats(&self) -> &'static [OutputFormat] {
        &[OutputFormat::Png, OutputFormat::Jpeg, OutputFormat::WebP]
    }
}
