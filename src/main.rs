use clap::Parser;

use carryscan::cli::{run, Cli, Commands};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::PerpPerp(args) => run::perp_perp(args).await,
        Commands::PerpSpot(args) => run::perp_spot(args).await,
        Commands::Venues(args) => run::venues(args).await,
    };

    if let Err(e) = result {
        eprintln!("carryscan: {e}");
        std::process::exit(1);
    }
}
