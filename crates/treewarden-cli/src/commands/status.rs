//! `treewarden status` — Query the status of a running node.

use clap::Args;
use serde::Deserialize;

use super::{fail, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    version: String,
    uptime_secs: u64,
    network_count: usize,
    max_nodes: usize,
    lease_duration_secs: u64,
}

pub async fn run(args: &StatusArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/status", args.endpoint.trim_end_matches('/'));

    let resp = match reqwest::get(&url).await {
        Ok(resp) => resp,
        Err(e) => {
            println!("Could not reach node at {}", args.endpoint);
            println!("  Error: {}", e);
            println!();
            println!("Is the node running? Start it with: treewarden-node");
            return Ok(());
        }
    };
    if !resp.status().is_success() {
        return Err(fail("status query", resp).await);
    }

    let data: StatusResponse = resp.json().await?;
    println!("Node Status:");
    println!("  Endpoint:  {}", args.endpoint);
    println!("  Version:   {}", data.version);
    println!("  Uptime:    {}s", data.uptime_secs);
    println!("  Networks:  {}", data.network_count);
    println!("  Max nodes: {}", data.max_nodes);
    println!("  Lease:     {}s", data.lease_duration_secs);
    Ok(())
}
