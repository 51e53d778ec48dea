use clap::Parser;
use dotenv::dotenv;
use std::error::Error;
use zerocode_chat::cli::Args;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter)
    ).init();

    zerocode_chat::run(args).await
}
