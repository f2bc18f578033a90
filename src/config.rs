use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings read from `opscope.toml`; command-line flags take precedence
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct OpscopeConfig {
    /// Directory holding the packages to scan
    pub search_path: Option<String>,
    /// Root packages, scanned in order
    #[serde(default)]
    pub roots: Vec<String>,
    /// Dotted module prefixes to skip
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Gitignore-style patterns hidden from the package listing
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Registry manifest (TOML or JSON) dumped by the host
    pub manifest: Option<String>,
    /// Identifiers known to be native operators
    #[serde(default)]
    pub builtins: Vec<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("opscope.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<OpscopeConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: OpscopeConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &OpscopeConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
