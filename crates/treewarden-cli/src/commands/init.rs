//! `treewarden init` — Write a default node configuration.

use clap::Args;
use std::path::PathBuf;

use treewarden_core::{DEFAULT_LEASE_SECS, DEFAULT_MAX_NODES};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory).
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

fn default_config() -> String {
    format!(
        r#"# Treewarden Node Configuration

[api]
listen_addr = "127.0.0.1"
port = 8080

[lease]
# Node ids and destinations must be below this value.
max_nodes = {DEFAULT_MAX_NODES}
# Seconds a granted edge stays live without renewal.
lease_duration_secs = {DEFAULT_LEASE_SECS}

[logging]
level = "info"
format = "text"
"#
    )
}

pub fn run(args: &InitArgs) -> anyhow::Result<()> {
    let config_path = args.dir.join("treewarden.toml");

    if config_path.exists() {
        anyhow::bail!("configuration file already exists at {}", config_path.display());
    }

    std::fs::create_dir_all(&args.dir)?;
    std::fs::write(&config_path, default_config())?;

    println!("Initialized Treewarden node at {}", config_path.display());
    println!("Edit treewarden.toml to customize your configuration.");
    println!("Run 'treewarden-node --config {}' to start the node.", config_path.display());
    Ok(())
}
