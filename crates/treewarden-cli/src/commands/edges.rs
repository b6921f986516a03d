//! `treewarden edges` — List the live edges of one graph.

use clap::Args;
use serde::Deserialize;
use treewarden_core::EdgeGrant;

use super::{fail, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct EdgesArgs {
    /// Network identifier.
    #[arg(short, long)]
    pub network: String,

    /// Objective function name.
    #[arg(short, long)]
    pub objective: String,

    /// Destination node id.
    #[arg(short, long)]
    pub destination: usize,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct EdgesResponse {
    edges: Vec<EdgeGrant>,
    count: usize,
}

pub async fn run(args: &EdgesArgs) -> anyhow::Result<()> {
    let url = format!(
        "{}/network/{}/graphs/{}/{}/edges",
        args.endpoint.trim_end_matches('/'),
        args.network,
        args.objective,
        args.destination
    );

    let resp = reqwest::get(&url).await?;
    if !resp.status().is_success() {
        return Err(fail("edge listing", resp).await);
    }

    let data: EdgesResponse = resp.json().await?;
    println!(
        "Live edges ({}/{}/{}): {}",
        args.network, args.objective, args.destination, data.count
    );
    for edge in &data.edges {
        println!(
            "  {:>3} -> {:<3} expires {}",
            edge.from,
            edge.to,
            edge.expires_at.to_rfc3339()
        );
    }
    Ok(())
}
