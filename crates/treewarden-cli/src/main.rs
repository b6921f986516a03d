//! Treewarden CLI — Command-line interface for a running coordinator node.
//!
//! Subcommands: init, request, release, edges, status.

mod commands;

use clap::{Parser, Subcommand};

/// Treewarden — loop-free routing trees through leased edges.
#[derive(Parser, Debug)]
#[command(name = "treewarden", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default node configuration file.
    Init(commands::init::InitArgs),
    /// Ask for an edge lease (or renew one).
    Request(commands::edge::EdgeArgs),
    /// Give up an edge lease.
    Release(commands::edge::EdgeArgs),
    /// List the live edges of one graph.
    Edges(commands::edges::EdgesArgs),
    /// Query the status of a running node.
    Status(commands::status::StatusArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Request(args) => commands::edge::request(args).await,
        Commands::Release(args) => commands::edge::release(args).await,
        Commands::Edges(args) => commands::edges::run(args).await,
        Commands::Status(args) => commands::status::run(args).await,
    }
}
