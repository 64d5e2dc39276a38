// ============================================================
// Layer 6 — Config Store
// ============================================================
// Reads and writes the model configuration as pretty JSON.
// Loading always validates, so a bad file is reported here with
// its path instead of panicking later inside a layer constructor.

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::ml::config::VqaConfig;

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, cfg: &VqaConfig) -> Result<()> {
        cfg.validate()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Cannot write config to '{}'", self.path.display()))?;

        tracing::debug!("Saved model config to '{}'", self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<VqaConfig> {
        let json = fs::read_to_string(&self.path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Create one with 'init-config' first.",
                    self.path.display()
                )
            })?;

        let cfg: VqaConfig = serde_json::from_str(&json)
            .with_context(|| format!("Malformed config '{}'", self.path.display()))?;
        cfg.validate()
            .with_context(|| format!("Invalid config '{}'", self.path.display()))?;

        Ok(cfg)
    }
}
