//! Print a single configuration value.

use anyhow::{bail, Context, Result};
use leafpress_core::Config;
use std::path::Path;

pub fn print_config_value(config_path: &Path, key: &str) -> Result<()> {
    let config = Config::from_file(config_path).context("Failed to load configuration")?;
    match config.get(key) {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => bail!("Unknown or unset configuration key '{}'", key),
    }
}
