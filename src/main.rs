mod cli;
mod cmd;

use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "tablegrep")]
#[command(version)]
#[command(about = "Compile schema-described search filters to SQL and classify fetched rows", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: cli::Commands,
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        cli::Commands::Sources(args) => cmd::sources(&args),
        cli::Commands::Schema(args) => cmd::schema(&args),
        cli::Commands::Compile(args) => cmd::compile(&args),
        cli::Commands::Classify(args) => cmd::classify(&args),
    }
}
