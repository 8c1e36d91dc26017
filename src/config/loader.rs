//! Configuration file discovery and loading.
//!
//! Merge order (later overrides earlier):
//! 1. User config (`~/.node-doctor/config.yml`)
//! 2. Project config (`<project>/.node-doctor.yml`)
//! 3. `NODE_DOCTOR_*` environment variables

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::merger::merge_layers;
use crate::config::schema::DoctorConfig;
use crate::error::{DoctorError, Result};
use crate::platform::HostEnv;

/// File name of the project config.
pub const PROJECT_CONFIG_FILE: &str = ".node-doctor.yml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "NODE_DOCTOR_";

/// Config file locations, whether or not they exist.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// `~/.node-doctor/config.yml`
    pub user: PathBuf,
    /// `<project>/.node-doctor.yml`
    pub project: PathBuf,
}

impl ConfigPaths {
    pub fn discover(home: &Path, project_root: &Path) -> Self {
        Self {
            user: home.join(".node-doctor").join("config.yml"),
            project: project_root.join(PROJECT_CONFIG_FILE),
        }
    }

    /// Paths in merge order.
    pub fn in_order(&self) -> [&Path; 2] {
        [&self.user, &self.project]
    }
}

/// Read a config file as a raw YAML value. A missing file is `None`.
pub fn load_config_value(path: &Path) -> Result<Option<serde_yaml::Value>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(DoctorError::Io(e)),
    };

    tracing::debug!("Loading config from {}", path.display());
    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|e| DoctorError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

fn parse_layers(layers: &[serde_yaml::Value], path: &Path) -> Result<DoctorConfig> {
    serde_yaml::from_value(merge_layers(layers)).map_err(|e| DoctorError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and merge the config files, then apply environment overrides.
///
/// With `config_override`, only that file is read and it must exist.
pub fn load_config(
    env: &HostEnv,
    project_root: &Path,
    config_override: Option<&Path>,
) -> Result<DoctorConfig> {
    let mut config = match config_override {
        Some(path) => {
            let value = load_config_value(path)?.ok_or_else(|| DoctorError::ConfigParseError {
                path: path.to_path_buf(),
                message: "file not found".to_string(),
            })?;
            parse_layers(&[value], path)?
        }
        None => {
            let paths = ConfigPaths::discover(&env.home, project_root);
            let mut layers = Vec::new();
            // Parse each layer on its own first so errors name the right file.
            for path in paths.in_order() {
                if let Some(value) = load_config_value(path)? {
                    parse_layers(std::slice::from_ref(&value), path)?;
                    layers.push(value);
                }
            }
            parse_layers(&layers, &paths.project)?
        }
    };

    apply_env_overrides(&mut config, env);
    Ok(config)
}

/// Overlay `NODE_DOCTOR_*` variables. Unparseable values are ignored.
pub fn apply_env_overrides(config: &mut DoctorConfig, env: &HostEnv) {
    let var = |key: &str| env.var(&format!("{}{}", ENV_PREFIX, key));

    if let Some(url) = var("REGISTRY_URL") {
        config.registry_url = Some(url.to_string());
    }
    if let Some(url) = var("SCHEDULE_URL") {
        config.schedule_url = Some(url.to_string());
    }
    if let Some(url) = var("DIST_INDEX_URL") {
        config.dist_index_url = Some(url.to_string());
    }
    if let Some(raw) = var("NETWORK_TIMEOUT_SECS") {
        match raw.trim().parse() {
            Ok(secs) => config.network_timeout_secs = Some(secs),
            Err(_) => tracing::warn!("Ignoring {}NETWORK_TIMEOUT_SECS={:?}", ENV_PREFIX, raw),
        }
    }
    if let Some(raw) = var("SKIP_PORTS") {
        config.skip_ports = parse_flag(raw).or(config.skip_ports);
    }
    if let Some(raw) = var("SKIP_SHELL") {
        config.skip_shell = parse_flag(raw).or(config.skip_shell);
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!("Ignoring non-boolean value {:?}", raw);
            None
        }
    }
}
