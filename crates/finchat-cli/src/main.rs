use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use finchat_application::ChatClient;
use finchat_infrastructure::ConfigStorage;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "finchat")]
#[command(about = "FinChat CLI - financial FAQ assistant client", long_about = None)]
struct Cli {
    /// Backend base URL (overrides config file and FINCHAT_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current session and cached conversations
    Status,
    /// Log in with email and password
    Login {
        email: Option<String>,
        password: Option<String>,
        /// Use the backend's demo account
        #[arg(long)]
        demo: bool,
    },
    /// Log out and continue anonymously
    Logout,
    /// Ask the assistant a question
    Ask {
        message: String,
        /// Route the question to an FAQ category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Print the messages of the current conversation
    History,
    /// List FAQ categories
    Categories,
    /// Upload a document to the knowledge base
    Upload {
        path: PathBuf,
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Search the knowledge base
    Search {
        query: String,
        #[arg(short = 'k', long, default_value_t = 5)]
        top_k: usize,
    },
    /// Delete a conversation
    Delete { id: String },
    /// Show the demo login credentials advertised by the backend
    DemoCredentials,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = ConfigStorage::new()
        .and_then(|storage| storage.load())
        .context("Failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        config.api_base_url = api_url.trim_end_matches('/').to_string();
    }
    tracing::debug!("Backend: {}", config.api_base_url);

    let client = ChatClient::from_config(&config)
        .await
        .context("Failed to open client storage")?;

    if let Commands::DemoCredentials = cli.command {
        return commands::session::demo_credentials(&client).await;
    }

    client
        .bootstrap()
        .await
        .context("Failed to establish a session with the backend")?;

    match cli.command {
        Commands::Status => commands::session::status(&client).await?,
        Commands::Login {
            email,
            password,
            demo,
        } => commands::session::login(&client, email, password, demo).await?,
        Commands::Logout => commands::session::logout(&client).await?,
        Commands::Ask { message, category } => {
            commands::chat::ask(&client, &message, category.as_deref()).await?
        }
        Commands::History => commands::chat::history(&client).await?,
        Commands::Categories => commands::chat::categories(&client).await?,
        Commands::Upload { path, title } => commands::documents::upload(&client, &path, title).await?,
        Commands::Search { query, top_k } => {
            commands::documents::search(&client, &query, top_k).await?
        }
        Commands::Delete { id } => commands::chat::delete(&client, &id).await?,
        Commands::DemoCredentials => {}
    }

    Ok(())
}
