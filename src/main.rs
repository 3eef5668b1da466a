use clap::Parser;
use comfy_days::cli::{run, Cli};
use comfy_days::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
