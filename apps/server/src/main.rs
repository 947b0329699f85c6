//! ContentPilot HTTP server entry point.
//!
//! Exposes the generate-article, ask-consultant, knowledge-base, and
//! publish-scheduled functions over HTTP. Clients and secrets are resolved
//! once at startup; a misconfigured server refuses to start instead of
//! failing on the first request.

mod routes;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;

use contentpilot_gemini::{GeminiClient, GeminiOptions};
use contentpilot_github::{GithubClient, GithubOptions};
use contentpilot_knowledge::load_knowledge_base;
use contentpilot_shared::{
    AppConfig, load_config, load_config_from, resolve_gemini_key, resolve_github_token,
    validate_remote_config,
};

use routes::AppState;

/// ContentPilot HTTP server.
#[derive(Parser)]
#[command(
    name = "contentpilot-server",
    version,
    about = "Serve the ContentPilot article functions over HTTP.",
    long_about = None,
)]
struct Args {
    /// Port to listen on.
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Path to the config file (defaults to ~/.contentpilot/contentpilot.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Initialize tracing based on CLI flags.
fn init_tracing(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match args.verbose {
        0 => "contentpilot=info",
        1 => "contentpilot=debug",
        _ => "contentpilot=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match args.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

/// Resolve secrets, build upstream clients, and load the knowledge base.
fn build_state(config: AppConfig) -> Result<AppState> {
    let api_key = resolve_gemini_key(&config)?;
    let mut gemini_opts = GeminiOptions::new(api_key, config.gemini.model.clone());
    gemini_opts.api_base = config.gemini.api_base.clone();
    gemini_opts.timeout_secs = config.gemini.timeout_secs;
    let gemini = GeminiClient::new(gemini_opts)?;

    let token = resolve_github_token(&config)?;
    let mut github_opts = GithubOptions::new(
        config.github.owner.clone(),
        config.github.repo.clone(),
        token,
    );
    github_opts.api_base = config.github.api_base.clone();
    github_opts.branch = config.github.branch.clone();
    let github = GithubClient::new(github_opts)?;

    let kb = load_knowledge_base(Path::new(&config.content.knowledge_base))?;

    Ok(AppState {
        config,
        gemini,
        github,
        kb,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_tracing(&args);

    let config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    validate_remote_config(&config)?;

    let state = build_state(config)?;
    let app = routes::router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "server listening");
    println!("ContentPilot server listening on http://{addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
