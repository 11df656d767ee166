pub mod error;
pub mod model;
pub mod validation;

pub use error::*;
pub use model::{
    CLUSTER_TAG_PREFIX, MachineProviderConfig, NetworkSelection, NetworkSpec, ROLE_TAG_PREFIX,
};
pub use validation::is_valid_cidr;

use std::path::{Path, PathBuf};

/// Environment variable pointing directly at a configuration file
pub const CONFIG_ENV: &str = "OSMACHINE_CONFIG";

const CONFIG_FILE: &str = "machine.yaml";
const CONFIG_DIR: &str = ".osmachine";

/// Locate the machine configuration file
///
/// Search order:
/// 1. `OSMACHINE_CONFIG` environment variable
/// 2. current directory: machine.yaml
/// 3. ./.osmachine/machine.yaml
/// 4. <user config dir>/osmachine/machine.yaml
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;

    let path = current_dir.join(CONFIG_FILE);
    if path.exists() {
        return Ok(path);
    }

    let path = current_dir.join(CONFIG_DIR).join(CONFIG_FILE);
    if path.exists() {
        return Ok(path);
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("osmachine").join(CONFIG_FILE);
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// Parse a configuration from YAML text
pub fn from_yaml_str(content: &str) -> Result<MachineProviderConfig> {
    Ok(serde_yaml::from_str(content)?)
}

/// Read and parse a configuration file
pub fn load(path: &Path) -> Result<MachineProviderConfig> {
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
