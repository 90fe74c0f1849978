//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Find, check and deploy MCP servers on this host.
#[derive(Debug, Parser)]
#[command(name = "mcpdeploy")]
#[command(about = "Resource-aware MCP server discovery and deployment")]
#[command(version)]
pub struct Cli {
    /// JSON configuration file (defaults to the built-in service profiles)
    #[arg(long, global = true, env = "MCPDEPLOY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_args_apply_after_subcommand() {
        let cli = Cli::parse_from(["mcpdeploy", "discover", "zen-mcp", "-v", "--config", "/etc/mcp.json"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/mcp.json")));
        assert!(matches!(
            cli.command,
            Commands::Discover { ref name, json: false } if name == "zen-mcp"
        ));
    }

    #[test]
    fn resources_accepts_port_list() {
        let cli = Cli::parse_from(["mcpdeploy", "resources", "--port", "8000", "--port", "8080"]);
        assert!(matches!(cli.command, Commands::Resources { ref ports } if ports == &[8000, 8080]));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["mcpdeploy"]).is_err());
    }
}
