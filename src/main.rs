//! Mentor Gateway CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mentor_gateway::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // `serve` installs its own subscriber from the logging config
    if !matches!(cli.command, Commands::Serve(_)) {
        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => cli::handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Serve(args) => cli::commands::serve::execute(args, &config, cli.json).await,
        Commands::Format(args) => cli::commands::format::execute(args, cli.json).await,
        Commands::Personas(args) => cli::commands::personas::execute(args, &config, cli.json).await,
        Commands::Countdown(args) => {
            cli::commands::countdown::execute(args, &config, cli.json).await
        }
    };

    if let Err(err) = result {
        cli::handle_error(err, cli.json);
    }
}
