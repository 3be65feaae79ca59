use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Library catalog shell and streaming chat client.
#[derive(Debug, Parser)]
#[command(name = "libris", version, about)]
pub struct Cli {
    /// Configuration file (defaults to the platform config directory).
    #[arg(long, short, global = true, env = "LIBRIS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). Overrides
    /// `RUST_LOG` when given.
    #[arg(long, short, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive catalog shell reading commands from stdin.
    Catalog,
    /// Chat with the configured endpoint, one message per line of stdin.
    ///
    /// Ctrl-C aborts the reply being streamed, or leaves when no reply is
    /// in flight. End of input also leaves.
    Chat {
        /// Override the configured chat endpoint.
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Run the sample catalog scenario.
    Demo,
}
