use std::{fs, path::PathBuf};

use cmdpal::{DEFAULT_CONFIG, PaletteConfig};

/// Returns the path to the config file
pub fn config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        dirs::config_dir().map(|p| p.join("cmdpal").join("config.txt"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        dirs::home_dir().map(|p| p.join(".config").join("cmdpal").join("config.txt"))
    }
}

/// Creates the config file from the commented template when it is missing.
pub fn ensure_config_file() -> Option<PathBuf> {
    let path = config_path()?;
    if path.exists() {
        return Some(path);
    }

    if let Some(parent) = path.parent()
        && let Err(error) = fs::create_dir_all(parent)
    {
        log::warn!("failed to create {}: {error}", parent.display());
        return None;
    }
    if let Err(error) = fs::write(&path, DEFAULT_CONFIG) {
        log::warn!("failed to write {}: {error}", path.display());
        return None;
    }
    log::info!("created default config at {}", path.display());
    Some(path)
}

pub fn load_config() -> PaletteConfig {
    match ensure_config_file() {
        Some(path) => PaletteConfig::load(&path),
        None => PaletteConfig::default(),
    }
}
