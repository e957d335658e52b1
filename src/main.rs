use clap::Parser;
use cws_qc::cli::{run, Cli};
use cws_qc::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
