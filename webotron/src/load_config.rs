/// `load_config` module: loads the optional YAML settings file and merges it with flags and
/// environment variables into the process-wide [`Settings`].
///
/// # Precedence
/// 1. Command-line flags and `WEBOTRON_*` environment variables (clap resolves these two)
/// 2. The YAML file named by `--config` / `WEBOTRON_CONFIG`
/// 3. The AWS default provider chain, decided later when the client is built
///
/// Settings are resolved once at startup and never change afterwards.
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

use crate::cli::GlobalArgs;

/// Keys accepted in the YAML settings file.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

/// Effective settings for this invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub profile: Option<String>,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
}

impl Settings {
    /// Resolve settings from parsed global arguments, reading the config file if one is named.
    pub fn resolve(args: &GlobalArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => load_config(path)?,
            None => FileConfig::default(),
        };
        let settings = Self::merge(args, file);
        info!(
            profile = ?settings.profile,
            region = ?settings.region,
            endpoint_url = ?settings.endpoint_url,
            "Settings resolved"
        );
        Ok(settings)
    }

    /// Flags and environment win over the file.
    pub fn merge(args: &GlobalArgs, file: FileConfig) -> Self {
        Self {
            profile: args.profile.clone().or(file.profile),
            region: args.region.clone().or(file.region),
            endpoint_url: args.endpoint_url.clone().or(file.endpoint_url),
        }
    }
}

/// Read and parse the YAML settings file at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = fs::read_to_string(path_ref)
        .inspect_err(|e| error!(error = ?e, config_path = ?path_ref, "Failed to read config file"))
        .with_context(|| format!("Failed to read config file {}", path_ref.display()))?;

    // An empty document deserialises to unit, not to a map.
    if content.trim().is_empty() {
        return Ok(FileConfig::default());
    }

    serde_yaml::from_str(&content)
        .inspect_err(|e| error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML"))
        .with_context(|| format!("Failed to parse config YAML {}", path_ref.display()))
}
