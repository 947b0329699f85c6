//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use contentpilot_core::publisher::{self, PublishConfig};
use contentpilot_core::scheduler::{self, RunConfig, RunProgress, RunReport};
use contentpilot_core::{consultant, generator};
use contentpilot_gemini::{GeminiClient, GeminiOptions};
use contentpilot_github::{GithubClient, GithubOptions, fetch_plan};
use contentpilot_knowledge::{format_knowledge_base, load_knowledge_base};
use contentpilot_shared::{
    AppConfig, PromptLanguage, TaskStatus, init_config, load_config, load_config_from,
    resolve_gemini_key, resolve_github_token, validate_remote_config,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ContentPilot: AI article generation for the blog.
#[derive(Parser)]
#[command(
    name = "contentpilot",
    version,
    about = "Generate and publish AI blog articles from a remote content plan.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the config file (defaults to ~/.contentpilot/contentpilot.toml).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Publish every scheduled article whose date has arrived.
    Run,

    /// Generate and publish a single article from a prompt.
    Generate {
        /// Topic request for the article.
        prompt: String,

        /// Instruction language: en or ru (defaults to the configured one).
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Ask the AI consultant a question about the company.
    Ask {
        /// The question to answer.
        question: String,
    },

    /// Print the knowledge-base context the consultant is grounded on.
    Kb,

    /// Show the remote content plan and which tasks are due.
    Plan,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "contentpilot=info",
        1 => "contentpilot=debug",
        _ => "contentpilot=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
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

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match &cli.command {
        Command::Run => cmd_run(config_path).await,
        Command::Generate { prompt, language } => {
            cmd_generate(config_path, prompt, language.as_deref()).await
        }
        Command::Ask { question } => cmd_ask(config_path, question).await,
        Command::Kb => cmd_kb(config_path).await,
        Command::Plan => cmd_plan(config_path).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

/// Load config from the override path if given, else the default location.
fn load_app_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(p) => Ok(load_config_from(p)?),
        None => Ok(load_config()?),
    }
}

// ---------------------------------------------------------------------------
// Client construction
// ---------------------------------------------------------------------------

/// Build a Gemini client from the loaded config, resolving the API key.
fn build_gemini_client(config: &AppConfig) -> Result<GeminiClient> {
    let api_key = resolve_gemini_key(config)?;

    let mut opts = GeminiOptions::new(api_key, config.gemini.model.clone());
    opts.api_base = config.gemini.api_base.clone();
    opts.timeout_secs = config.gemini.timeout_secs;

    Ok(GeminiClient::new(opts)?)
}

/// Build a GitHub client from the loaded config, resolving the token.
fn build_github_client(config: &AppConfig) -> Result<GithubClient> {
    validate_remote_config(config)?;
    let token = resolve_github_token(config)?;

    let mut opts = GithubOptions::new(
        config.github.owner.clone(),
        config.github.repo.clone(),
        token,
    );
    opts.api_base = config.github.api_base.clone();
    opts.branch = config.github.branch.clone();

    Ok(GithubClient::new(opts)?)
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl RunProgress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn task_published(&self, title: &str, current: usize, total: usize) {
        self.spinner
            .println(format!("  Published [{current}/{total}] {title}"));
    }

    fn task_failed(&self, prompt: &str, error: &str, current: usize, total: usize) {
        self.spinner
            .println(format!("  Failed [{current}/{total}] {prompt}: {error}"));
    }

    fn done(&self, _report: &RunReport) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(config_path: Option<&Path>) -> Result<()> {
    let config = load_app_config(config_path)?;
    let gemini = build_gemini_client(&config)?;
    let github = build_github_client(&config)?;

    let run_config = RunConfig {
        plan_path: config.content.plan_path.clone(),
        language: config.content.language,
        publish: PublishConfig::from_content(&config.content),
    };

    info!(plan = %run_config.plan_path, "starting scheduled publication run");

    let progress = CliProgress::new();
    let report = scheduler::run_scheduled(&gemini, &github, &run_config, &progress).await?;

    println!();
    if report.due == 0 {
        println!("  No articles due for publication today.");
    } else {
        println!("  Scheduled run finished!");
        println!("  Due:       {}", report.due);
        println!("  Published: {}", report.published);
        println!("  Failed:    {}", report.failed);
        println!(
            "  Plan:      {}",
            if report.plan_updated { "updated" } else { "unchanged" }
        );
        println!("  Time:      {:.1}s", report.elapsed.as_secs_f64());
        for article in &report.articles {
            println!("  Article:   {}", article.path);
        }
    }
    println!();

    Ok(())
}

async fn cmd_generate(
    config_path: Option<&Path>,
    prompt: &str,
    language: Option<&str>,
) -> Result<()> {
    let config = load_app_config(config_path)?;

    let language = match language {
        Some(raw) => raw.parse::<PromptLanguage>().map_err(|e| eyre!(e))?,
        None => config.content.language,
    };

    let gemini = build_gemini_client(&config)?;
    let github = build_github_client(&config)?;

    info!(prompt, %language, "generating single article");

    let progress = CliProgress::new();
    progress.phase("Generating article");
    let draft = generator::generate_draft(&gemini, prompt, language).await?;

    progress.phase(&format!("Publishing \"{}\"", draft.title));
    let publish_config = PublishConfig::from_content(&config.content);
    let article = publisher::publish_article(&github, &publish_config, &draft).await?;
    progress.finish();

    println!();
    println!("  Article \"{}\" created successfully!", article.title);
    println!("  Slug: {}", article.slug);
    println!("  Path: {}", article.path);
    println!();

    Ok(())
}

async fn cmd_ask(config_path: Option<&Path>, question: &str) -> Result<()> {
    let config = load_app_config(config_path)?;
    let kb = load_knowledge_base(Path::new(&config.content.knowledge_base))?;
    let gemini = build_gemini_client(&config)?;

    info!(question, "asking the consultant");

    let answer = consultant::answer_question(&gemini, &kb, question).await?;

    println!();
    println!("{answer}");
    println!();

    Ok(())
}

async fn cmd_kb(config_path: Option<&Path>) -> Result<()> {
    let config = load_app_config(config_path)?;
    let kb = load_knowledge_base(Path::new(&config.content.knowledge_base))?;
    println!("{}", format_knowledge_base(&kb));
    Ok(())
}

async fn cmd_plan(config_path: Option<&Path>) -> Result<()> {
    let config = load_app_config(config_path)?;
    let github = build_github_client(&config)?;

    let (tasks, revision) = fetch_plan(&github, &config.content.plan_path).await?;
    let today = Utc::now().date_naive();

    println!();
    println!(
        "  Content plan: {} ({} tasks, revision {revision})",
        config.content.plan_path,
        tasks.len()
    );
    println!();

    for task in &tasks {
        let status = match task.status {
            TaskStatus::Scheduled => "scheduled",
            TaskStatus::Published => "published",
            TaskStatus::Failed => "failed",
        };
        let due = if task.is_due(today) { "  (due)" } else { "" };
        println!("  {status:9}  {}  {}{due}", task.publish_date, task.prompt);
    }
    println!();

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = load_app_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
