// Optimization MCP - Main Entry Point
//
// Runs the MCP tool server on stdio, or one-shot commands against the
// optimization service. Stdout is reserved for protocol and command output;
// all logging goes to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use optimization_mcp::client::{OptimizationClient, DEFAULT_REPORT_LIMIT};
use optimization_mcp::commands::{self, ProblemKind};
use optimization_mcp::config::Config;
use optimization_mcp::mcp::{McpServer, StdioTransport};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

/// Optimization MCP: LP/MIP/TSP solving tools for assistant hosts
#[derive(Parser, Debug)]
#[command(name = "optimization-mcp")]
#[command(version)]
#[command(about = "MCP server and client for a remote optimization service", long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Optimization service base URL
    #[arg(long, global = true)]
    server_url: Option<String>,

    /// API key sent to the optimization service
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the MCP server on stdin/stdout (default)
    Serve,
    /// Print the tool declarations as JSON
    Tools,
    /// Solve a problem stored in a JSON file
    Solve {
        /// Problem class
        #[arg(value_enum)]
        kind: ProblemKind,

        /// Path to the problem JSON
        #[arg(short, long)]
        file: PathBuf,

        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Analyze a natural-language problem description
    Analyze {
        /// Problem description
        description: String,

        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Retrieve generated reports
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },
}

#[derive(Subcommand, Debug)]
enum ReportAction {
    /// Fetch a report's HTML
    Get {
        /// Report identifier
        id: String,

        /// Write the HTML to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List stored reports
    List {
        /// Maximum number of reports
        #[arg(long, default_value_t = DEFAULT_REPORT_LIMIT)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(Config::config_path);
    let mut config = Config::load_from_path(&config_path)?;
    if let Some(url) = &args.server_url {
        config.server.url = url.clone();
    }
    if let Some(key) = &args.api_key {
        config.server.api_key = Some(key.clone());
    }
    config.validate().context("Invalid configuration")?;

    init_tracing(&config, args.verbose)?;
    if config_path.exists() {
        info!("Loaded configuration from {:?}", config_path);
    } else {
        debug!("Config file not found at {:?}, using defaults", config_path);
    }

    let command = args.command.unwrap_or(Commands::Serve);
    if let Commands::Tools = command {
        println!("{}", commands::tools_json()?);
        return Ok(());
    }

    let client = OptimizationClient::from_config(&config.server)
        .context("Failed to create optimization client")?;

    let output = match command {
        Commands::Serve | Commands::Tools => {
            info!("Using optimization service at {}", config.server.url);
            let server = McpServer::new(Arc::new(client));
            server.serve(StdioTransport::new()).await?;
            return Ok(());
        }
        Commands::Solve { kind, file, json } => {
            commands::solve_from_file(&client, kind, &file, json).await?
        }
        Commands::Analyze { description, json } => {
            commands::analyze(&client, &description, json).await?
        }
        Commands::Report { action } => match action {
            ReportAction::Get { id, output } => {
                commands::fetch_report(&client, &id, output.as_deref()).await?
            }
            ReportAction::List { limit } => commands::list_reports(&client, limit).await?,
        },
    };

    println!("{}", output);
    Ok(())
}

/// Initialize tracing on stderr
fn init_tracing(config: &Config, verbose: bool) -> Result<()> {
    let level = if verbose || config.server.debug {
        Level::DEBUG
    } else {
        config.log_level()?
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.logging.format.to_lowercase().as_str() {
        "json" => builder.json().init(),
        "pretty" => builder.pretty().init(),
        _ => builder.compact().init(),
    }

    Ok(())
}
