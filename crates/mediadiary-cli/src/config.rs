use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use mediadiary_core::TOP_LIMIT;

#[derive(Debug, Serialize, Deserialize)]
pub struct DiaryConfig {
    pub store: StoreSection,
    #[serde(default)]
    pub chart: ChartSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSection {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChartSection {
    #[serde(default = "default_top_limit")]
    pub top_limit: usize,
}

impl Default for ChartSection {
    fn default() -> Self {
        Self {
            top_limit: TOP_LIMIT,
        }
    }
}

fn default_top_limit() -> usize {
    TOP_LIMIT
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct LoggingSection {
    /// `tracing` filter directive, e.g. "mediadiary_core=debug"
    pub filter: Option<String>,
}

impl DiaryConfig {
    pub fn new(store_path: PathBuf, top_limit: usize) -> Self {
        Self {
            store: StoreSection {
                path: store_path.to_string_lossy().to_string(),
            },
            chart: ChartSection { top_limit },
            logging: LoggingSection::default(),
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("diary.sqlite3"))
}

pub fn default_session_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("session.json"))
}

pub fn read_config(path: &Path) -> anyhow::Result<DiaryConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &DiaryConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("mediadiary"));
        }
    }
    Ok(home_dir()?.join(".config").join("mediadiary"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("mediadiary"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("mediadiary"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_take_defaults() {
        let config: DiaryConfig =
            toml::from_str("[store]\npath = \"/tmp/diary.sqlite3\"\n").expect("parse");
        assert_eq!(config.chart.top_limit, TOP_LIMIT);
        assert!(config.logging.filter.is_none());
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        write_config(&path, &DiaryConfig::new(PathBuf::from("/data/d.sqlite3"), 10))
            .expect("write");
        let config = read_config(&path).expect("read");
        assert_eq!(config.store.path, "/data/d.sqlite3");
        assert_eq!(config.chart.top_limit, 10);
    }
}
