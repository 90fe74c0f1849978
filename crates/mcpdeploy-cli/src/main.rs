//! CLI entry point.

use clap::Parser;

use mcpdeploy_cli::{Cli, CliError, Commands, bootstrap, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    bootstrap::init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        std::process::exit(code);
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = bootstrap::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Discover { name, json } => {
            let engine = bootstrap::build_engine(config)?;
            handlers::discover::execute(&engine, &name, json).await?;
        }
        Commands::Check { name, json } => {
            let engine = bootstrap::build_engine(config)?;
            handlers::check::execute(&engine, &name, json).await?;
        }
        Commands::Resources { ports } => {
            handlers::resources::execute(&config, &ports).await?;
        }
        Commands::Services => {
            handlers::services::execute(&config)?;
        }
    }

    Ok(())
}
