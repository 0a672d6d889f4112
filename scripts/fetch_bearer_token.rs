//! Twitter App-Only Bearer Token Utility
//!
//! This script exchanges the consumer token and secret from the tweetsearch
//! configuration for an app-only bearer token and prints it, which is handy
//! for checking credentials or calling the API by hand.

use std::path::PathBuf;

use tweetsearch::config::{config_path, SearchConfig};
use tweetsearch::twitter::obtain_bearer_token;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    println!("🔑 Twitter App-Only Bearer Token Utility");
    println!("=======================================");

    // Optional first argument overrides the config file location
    let cli_path = std::env::args().nth(1).map(PathBuf::from);
    let path = config_path(cli_path.as_deref());
    println!("Using configuration from {}", path.display());

    let config = match SearchConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    };

    let client = reqwest::Client::new();
    match obtain_bearer_token(&client, &config.api_base, &config.credentials).await {
        Ok(token) => {
            println!();
            println!("✅ Bearer token obtained:");
            println!("{}", token);
            println!();
            println!("📝 Use it as: Authorization: Bearer <token>");
        }
        Err(e) => {
            eprintln!("❌ Failed to obtain bearer token: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
