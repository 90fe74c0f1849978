//! Available subcommands.

use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find a running instance of a service, deploying one if needed
    Discover {
        /// Service name (e.g. "zen-mcp", "context7")
        name: String,
        /// Print the connection as JSON
        #[arg(long)]
        json: bool,
    },

    /// Look for a running instance without deploying anything
    Check {
        /// Service name
        name: String,
        /// Print the connection as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show available memory, CPU usage and port availability
    Resources {
        /// Port to probe (repeatable)
        #[arg(long = "port", short = 'p')]
        ports: Vec<u16>,
    },

    /// List configured services and how they are deployed
    Services,
}
