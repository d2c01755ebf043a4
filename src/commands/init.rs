//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use crate::inputs::write_template;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Directory the configured relative paths resolve against
    pub base_dir: PathBuf,
    pub config_path: PathBuf,
    pub force: bool,
}

/// What init created
#[derive(Debug, Clone, Serialize)]
pub struct InitReport {
    pub config_path: String,
    pub input_file: String,
    /// False when an existing input file was left alone
    pub input_created: bool,
    pub data_dir: String,
}

/// Write the default config, an input template and the data directory
pub fn cmd_init(options: InitOptions) -> Result<InitReport> {
    let InitOptions {
        base_dir,
        config_path,
        force,
    } = options;

    if config_path.exists() && !force {
        return Err(Error::AlreadyInitialized(config_path.display().to_string()));
    }

    let config = Config::default();
    config.validate()?;
    config.save(&config_path)?;

    let input_path = base_dir.join(config.input_path());
    let input_created = !input_path.exists();
    if input_created {
        write_template(&input_path)?;
        info!("Created input template at {:?}", input_path);
    } else {
        info!("Keeping existing input file {:?}", input_path);
    }

    let history_path = base_dir.join(config.history_path());
    let data_dir = history_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| base_dir.clone());
    std::fs::create_dir_all(&data_dir)?;
    info!("Data directory ready at {:?}", data_dir);

    Ok(InitReport {
        config_path: config_path.display().to_string(),
        input_file: input_path.display().to_string(),
        input_created,
        data_dir: data_dir.display().to_string(),
    })
}

/// Print init results to console
pub fn print_init_report(report: &InitReport) {
    println!("\n✓ yt-tracker initialized");
    println!("  Config: {}", report.config_path);
    if report.input_created {
        println!("  Input template: {}", report.input_file);
    } else {
        println!("  Input file (kept): {}", report.input_file);
    }
    println!("  Data directory: {}", report.data_dir);
    println!("\nNext steps:");
    println!("  1. Add one video URL or ID per line under the 'video' header");
    println!("  2. Export YOUTUBE_API_KEY (or put it in .env)");
    println!("  3. Run 'yt-tracker collect'");
}
