use anyhow::{Context, Result};
use partial_pair_core::Settings;
use std::fs;
use std::io;
use std::path::Path;

/// Reads settings from a TOML file, falling back to defaults when the file does not exist yet.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("Could not read {}", path.display()));
        }
    };
    toml::from_str(&text).with_context(|| format!("Invalid settings in {}", path.display()))
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    let text = toml::to_string(settings).context("Could not encode settings")?;
    fs::write(path, text).with_context(|| format!("Could not write {}", path.display()))
}

#[cfg(test)]
pub(crate) fn scratch_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("partial-pair-{}-{}", std::process::id(), name))
}
