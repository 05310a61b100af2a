use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskmaster::{api, config::Config, db};

#[derive(Parser)]
#[command(name = "taskmaster")]
#[command(about = "Task dashboard with priorities, due dates and status overview")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard server
    Serve(ServeArgs),
    /// Check whether a running server and its store are healthy
    Status {
        /// Base URL of the running server
        #[arg(long, default_value = "http://127.0.0.1:8501")]
        url: String,
    },
}

#[derive(Args, Clone, Default)]
struct ServeArgs {
    /// Address to bind (defaults to the secrets file, then 127.0.0.1)
    #[arg(long)]
    host: Option<String>,

    /// Port for the dashboard (defaults to the secrets file, then 8501)
    #[arg(short, long)]
    port: Option<u16>,

    /// Connection URI of the task store
    #[arg(long, env = "TASKMASTER_STORE_URI", hide_env_values = true)]
    store_uri: Option<String>,

    /// Path to the JSON secrets file
    #[arg(long)]
    secrets: Option<PathBuf>,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "taskmaster=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = Config::load(args.secrets.as_deref())?;
    let uri = config.store_uri(args.store_uri.as_deref())?;

    // No store, no dashboard: stop here rather than serve empty pages.
    let db = db::Database::connect(&uri)?;
    db.migrate()?;

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);

    let app = api::create_router(db);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;
    tracing::info!("TaskMaster listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn status(url: &str) -> anyhow::Result<()> {
    let health_url = format!("{}/health", url.trim_end_matches('/'));
    let response = reqwest::get(&health_url)
        .await
        .with_context(|| format!("TaskMaster is not reachable at {}", url))?;

    let code = response.status();
    let body: serde_json::Value = response.json().await.unwrap_or_default();
    let state = body["status"].as_str().unwrap_or("unknown");
    let version = body["version"].as_str().unwrap_or("?");

    if code.is_success() {
        println!("TaskMaster {} at {}: {}", version, url, state);
        Ok(())
    } else {
        anyhow::bail!("TaskMaster {} at {} reports {} ({})", version, url, state, code)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve(args)) => serve(args).await,
        Some(Commands::Status { url }) => status(&url).await,
        None => serve(cli.serve).await,
    }
}
