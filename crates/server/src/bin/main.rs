// Somnia Playground - backend services for the Somnia browser IDE
// Copyright (C) 2025 Somnia Playground Developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Somnia Playground API server entry point.

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use clap::Parser;
use eyre::Result;
use playground_common::{init_logging, PlaygroundConfig};
use playground_server::PlaygroundServer;
use tracing::info;

/// Somnia Playground API Server
#[derive(Parser, Debug)]
#[command(name = "playground-server")]
#[command(about = "Somnia Playground API Server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Somnia RPC URL (overrides SOMNIA_RPC_URL)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Verbosity level (repeat for more: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // Set RUST_LOG based on verbosity
    if std::env::var("RUST_LOG").is_err() {
        let level = match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        std::env::set_var("RUST_LOG", level);
    }

    init_logging("playground-server", true)?;

    let mut config = PlaygroundConfig::from_env();
    if let Some(rpc_url) = args.rpc_url {
        config.rpc_url = rpc_url;
    }
    info!(rpc = %config.rpc_url, network = config.network.name, "starting playground server");

    let ip = IpAddr::from_str(&args.host)?;
    let addr = SocketAddr::from((ip, args.port));
    let server = PlaygroundServer::new(config);

    tokio::select! {
        result = server.serve(addr) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    Ok(())
}
