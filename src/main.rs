use clap::Parser;

mod cli;
mod runner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    runner::run_from_cli(cli).await
}
