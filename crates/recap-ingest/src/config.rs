use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub project: ProjectConfig,
    pub display: DisplayConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub id: String,
    /// Where the db lives. Tilde paths are expanded at use time.
    pub data_root: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub show_task_counts: Option<bool>,
    #[serde(default)]
    pub show_play_times: Option<bool>,
}

impl Config {
    pub fn default_for_root(project_id: &str) -> Self {
        Self {
            project: ProjectConfig {
                id: project_id.to_string(),
                data_root: ".recap".to_string(),
            },
            display: DisplayConfig {
                show_task_counts: Some(true),
                show_play_times: Some(true),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: Config = toml::from_str(&s).with_context(|| "parse recap.toml")?;
        Ok(cfg)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let s = toml::to_string_pretty(self).with_context(|| "serialize toml")?;
        std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    pub fn config_path(root: &Path) -> PathBuf {
        root.join(".recap").join("recap.toml")
    }

    pub fn data_root(&self, root: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(&self.project.data_root).to_string();
        let p = PathBuf::from(expanded);
        if p.is_absolute() {
            p
        } else {
            root.join(p)
        }
    }

    pub fn db_path(&self, root: &Path) -> PathBuf {
        self.data_root(root).join("recap.db")
    }

    pub fn show_task_counts(&self) -> bool {
        self.display.show_task_counts.unwrap_or(true)
    }

    pub fn show_play_times(&self) -> bool {
        self.display.show_play_times.unwrap_or(true)
    }
}
