//! localdir CLI entry point
//!
//! Local business directory search - CLI + local API

use localdir::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
