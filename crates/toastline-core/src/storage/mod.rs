mod config;

pub use config::{BehaviourConfig, Config, SlotsConfig, TimingConfig};

use std::path::PathBuf;

use crate::error::CoreError;

/// Returns the toastline data directory, creating it if needed.
///
/// `TOASTLINE_CONFIG_DIR` overrides the location. Otherwise it is
/// `~/.config/toastline[-dev]/`, with `TOASTLINE_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let dir = match std::env::var_os("TOASTLINE_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TOASTLINE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("toastline-dev")
            } else {
                base_dir.join("toastline")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
