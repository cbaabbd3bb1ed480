//! ResumeGuide - multi-agent resume guidance in the terminal

use clap::{Parser, Subcommand};
use tracing::error;

mod app;
mod commands;
mod serve;

#[derive(Parser)]
#[command(name = "resumeguide")]
#[command(about = "🤖 A 3-agent system for B.Tech resume guidance")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with an agent (interactive unless -m is given)
    Chat {
        /// Agent to talk to: profile, reviewer, or coach
        #[arg(short, long, default_value = "profile")]
        agent: String,

        /// Message to send (one-shot); omit for interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Start the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 8080)]
        port: u16,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show system status
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Serve { verbose: true, .. }) {
        tracing_subscriber::fmt().with_env_filter("debug").init();
    } else {
        tracing_subscriber::fmt::init();
    }

    match cli.command {
        Commands::Chat { agent, message } => {
            if let Err(e) = commands::chat_command(agent, message).await {
                error!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Serve { host, port, .. } => {
            if let Err(e) = serve::serve_command(host, port).await {
                error!("Serve failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Status => {
            if let Err(e) = commands::status_command().await {
                error!("Status failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}
