mod cli;
mod log;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Keys may come from a .env file in the working directory
    dotenvy::dotenv().ok();

    if let Err(e) = cli::run().await {
        cli::ux::present_error(e);
        std::process::exit(1);
    }
    Ok(())
}
