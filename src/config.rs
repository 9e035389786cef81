use std::fs;

use anyhow::{Context, Result, anyhow, bail};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::copy::DEFAULT_BUFFER_SIZE;
use crate::ops::ExistPolicy;

const CONFIG_DIR: &str = "filekit";
const CONFIG_FILENAME: &str = "config.toml";

/// Settings for the `filekit` binary, loaded from `<config dir>/filekit/config.toml` by default.
#[derive(Debug, Deserialize, Default)]
pub struct FilekitConfig {
    pub buffer_size: Option<usize>,
    pub exist_policy: Option<ExistPolicy>,
}

impl FilekitConfig {
    pub fn buffer_size(&self) -> usize {
        self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE)
    }

    pub fn exist_policy(&self) -> ExistPolicy {
        self.exist_policy.unwrap_or_default()
    }
}

pub fn parse(raw: &str) -> Result<FilekitConfig> {
    let config: FilekitConfig = toml::from_str(raw)?;
    if config.buffer_size == Some(0) {
        bail!("buffer_size must be greater than zero");
    }
    Ok(config)
}

/// Load a configuration file from disk and deserialize it.
pub fn load_from_path(path: &Utf8Path) -> Result<FilekitConfig> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading config {}", path))?;
    parse(&raw).with_context(|| format!("parsing config {}", path))
}

/// Resolve the effective configuration: an explicit path must exist, the
/// per-user default is optional.
pub fn load(explicit: Option<&Utf8Path>) -> Result<FilekitConfig> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }

    match default_path()? {
        Some(path) if path.exists() => {
            tracing::debug!(path = %path, "using user config");
            load_from_path(&path)
        }
        _ => Ok(FilekitConfig::default()),
    }
}

fn default_path() -> Result<Option<Utf8PathBuf>> {
    let Some(dir) = dirs::config_dir() else {
        return Ok(None);
    };
    let path = dir.join(CONFIG_DIR).join(CONFIG_FILENAME);
    Utf8PathBuf::from_path_buf(path)
        .map(Some)
        .map_err(|_| anyhow!("config path not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.buffer_size(), DEFAULT_BUFFER_SIZE);
        assert_eq!(config.exist_policy(), ExistPolicy::Overwrite);
    }

    #[test]
    fn reads_buffer_size_and_policy() {
        let config = parse("buffer_size = 65536\nexist_policy = \"skip\"\n").unwrap();
        assert_eq!(config.buffer_size(), 65536);
        assert_eq!(config.exist_policy(), ExistPolicy::Skip);
    }

    #[test]
    fn rejects_zero_buffer_size() {
        assert!(parse("buffer_size = 0").is_err());
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(parse("exist_policy = \"merge\"").is_err());
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("missing.toml")).unwrap();
        assert!(load(Some(&path)).is_err());
    }

    #[test]
    fn loads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("filekit.toml")).unwrap();
        fs::write(&path, "exist_policy = \"fail\"").unwrap();
        assert_eq!(load(Some(&path)).unwrap().exist_policy(), ExistPolicy::Fail);
    }
}
