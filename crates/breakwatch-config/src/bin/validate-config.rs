//! Config validation CLI tool
//!
//! Validates a breakwatch configuration file and reports any errors.

use breakwatch_config::{ConfigError, StorageBackend, CURRENT_CONFIG_VERSION};
use breakwatch_util::default_config_path;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a breakwatch configuration file.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match breakwatch_config::load_config(&config_path) {
        Ok(settings) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", CURRENT_CONFIG_VERSION);
            println!("  Status URL:     {}", settings.server.status_url());
            println!("  Start URL:      {}", settings.server.start_url());
            println!("  End URL:        {}", settings.server.end_url());
            println!("  Storage key:    {}", settings.storage.key);
            match settings.storage.backend {
                StorageBackend::Sqlite => {
                    println!("  Storage:        sqlite ({})", settings.storage.data_dir.display())
                }
                StorageBackend::Memory => println!("  Storage:        memory"),
            }
            println!(
                "  Tick interval:  {} ms",
                settings.display.tick_interval.as_millis()
            );
            println!(
                "  Status timeout: {} ms",
                settings.display.status_dismiss.as_millis()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver, CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
