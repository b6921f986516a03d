//! `treewarden request` / `treewarden release` — Lease or release one edge.

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Deserialize;

use super::{fail, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct EdgeArgs {
    /// Network identifier.
    #[arg(short, long)]
    pub network: String,

    /// Objective function name.
    #[arg(short, long)]
    pub objective: String,

    /// Destination node id.
    #[arg(short, long)]
    pub destination: usize,

    /// Node claiming the successor.
    #[arg(long)]
    pub from: usize,

    /// Successor node.
    #[arg(long)]
    pub to: usize,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

impl EdgeArgs {
    fn url(&self, action: &str) -> String {
        format!(
            "{}/network/{}/graphs/{}/{}/edges/{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.network,
            self.objective,
            self.destination,
            self.from,
            self.to,
            action
        )
    }
}

#[derive(Deserialize)]
struct GrantResponse {
    expires_at: i64,
}

pub async fn request(args: &EdgeArgs) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let resp = client.post(args.url("request")).send().await?;

    if !resp.status().is_success() {
        return Err(fail("edge request", resp).await);
    }

    let data: GrantResponse = resp.json().await?;
    println!("Edge {} -> {} granted.", args.from, args.to);
    match DateTime::<Utc>::from_timestamp(data.expires_at, 0) {
        Some(expires) => println!("  Expires:  {} ({})", expires.to_rfc3339(), data.expires_at),
        None => println!("  Expires:  {}", data.expires_at),
    }
    Ok(())
}

pub async fn release(args: &EdgeArgs) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let resp = client.post(args.url("release")).send().await?;

    if !resp.status().is_success() {
        return Err(fail("edge release", resp).await);
    }

    println!("Edge {} -> {} released.", args.from, args.to);
    Ok(())
}
