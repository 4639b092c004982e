use anyhow::Result;
use songlink_anisong::{config, Config};
use std::path::PathBuf;

/// Show the current effective configuration.
pub fn show_config(db_override: Option<PathBuf>) -> Result<()> {
    let config = Config::load_with_db_path(db_override)?;

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!(
        "File exists: {}\n",
        if exists { "yes" } else { "no (using defaults)" }
    );

    println!("Settings:");
    println!("  database_path: {}", config.database_path.display());
    println!("  anisong_api_base: {}", config.anisong_api_base);
    println!("  request_timeout_secs: {}", config.request_timeout_secs);
    println!("  max_retries: {}", config.max_retries);
    println!("  requests_per_second: {}", config.requests_per_second);

    println!("\nPriority: CLI args > ENV vars (SONGLINK_*) > Config file > Defaults");

    Ok(())
}

/// Show the config file path.
pub fn show_path() -> Result<()> {
    println!("{}", config::config_file_path().display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure songlink.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
