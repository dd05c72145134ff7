//! `jarvis init`: first-time setup.

use jarvis_config::AppConfig;
use std::path::Path;

pub fn run(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("Jarvis: First-Time Setup");
    println!("========================\n");

    if write_default_config(&config_path, force)? {
        println!("Created config.toml at: {}", config_path.display());
        println!("\nNext steps:");
        println!("   1. Edit {} and add your API key", config_path.display());
        println!("      (or set OPENAI_API_KEY in the environment)");
        println!("   2. Run: jarvis chat\n");
    } else {
        println!("Config already exists at: {}", config_path.display());
        println!("   Edit it manually or re-run with --force.\n");
    }

    Ok(())
}

/// Write the starter config to `path`. Returns `false` when a file is
/// already there and `force` is not set.
fn write_default_config(path: &Path, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, AppConfig::default_toml())?;
    Ok(true)
}
