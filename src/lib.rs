pub mod auth;
pub mod cli;
pub mod export;
pub mod models;
pub mod responder;
pub mod server;
pub mod stream;
pub mod templates;

use cli::Args;
use log::info;
use server::api::AppState;
use server::Server;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Token TTL: {}s", args.token_ttl_secs);
    info!("Stream Preroll: {}ms", args.stream_preroll_ms);
    info!(
        "Stream Delay: {}ms (+ up to {}ms jitter)",
        args.stream_delay_ms,
        args.stream_jitter_ms
    );
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let state = AppState::from_args(&args);
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, state, args);
    server.run().await?;

    Ok(())
}
