use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;
use wordjump_core::{
    SessionController, WordjumpConfig,
    bridge::{HostBridge, LocalHost, PageAgent, PageState, UnavailableHost, serve_agent},
    format::format_match,
    types::SearchMatch,
};

use crate::{
    feedback::start_feedback,
    workers::feedback_sink::OutputMode,
};

mod feedback;
mod workers;

#[derive(Parser)]
#[command(name = "wordjump")]
#[command(about = "Search a YouTube video's transcript and jump the player to where a word is said")]
struct Cli {
    /// Log filter, e.g. "debug" or "wordjump_core=trace". Overrides RUST_LOG.
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the transcript of the video on a page
    Search(SearchArgs),

    /// Answer player requests for a page over stdin/stdout (native messaging framing)
    Agent {
        /// URL of the page the agent pretends to run in
        #[arg(long)]
        url: String,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Word or phrase to look for
    term: String,

    /// Page URL; without one the demo video is searched
    #[arg(short, long)]
    url: Option<String>,

    /// Jump to the N-th match (1-based)
    #[arg(short, long)]
    jump: Option<usize>,

    /// Follow playback for this many seconds after jumping
    #[arg(short, long)]
    follow: Option<u64>,

    /// Print events and matches as JSON lines
    #[arg(long)]
    json: bool,
}

fn init_tracing(filter: Option<&str>) {
    let filter = filter
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn print_matches(matches: &[SearchMatch]) {
    for (i, m) in matches.iter().enumerate() {
        println!("{:>4} {}", style(format!("{}.", i + 1)).dim(), format_match(m));
    }
}

async fn run_search(config: WordjumpConfig, args: SearchArgs) -> Result<()> {
    let mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let host: Arc<dyn HostBridge> = match &args.url {
        Some(url) => Arc::new(LocalHost::attach(PageAgent::new(
            PageState::watch_page(url).shared(),
        ))),
        None => Arc::new(UnavailableHost),
    };

    let feedback = start_feedback(mode)?;
    let session = Arc::new(SessionController::from_config(
        &config,
        host,
        feedback.bus.clone(),
    ));

    let spinner = (mode == OutputMode::Human).then(|| create_spinner("Searching transcript..."));
    let report = session.search(&args.term).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let report = report.context("search was superseded")?;

    match mode {
        OutputMode::Json => println!(
            "{}",
            serde_json::json!({ "matches": &report.matches })
        ),
        OutputMode::Human => print_matches(&report.matches),
    }

    if let Some(n) = args.jump {
        let target = n
            .checked_sub(1)
            .and_then(|i| report.matches.get(i))
            .with_context(|| format!("no match #{n}, found {}", report.matches.len()))?;

        if session.jump_to(target.timestamp).await.is_success() && mode == OutputMode::Human {
            println!("{} Jumped to {}", style("→").cyan().bold(), format_match(target));
        }

        if let Some(secs) = args.follow {
            let poller = session.follow_playback(config.poll_interval());
            // ends early if playback stops
            let _ = tokio::time::timeout(Duration::from_secs(secs), poller.join()).await;
        }
    }

    feedback.shutdown().await?;
    Ok(())
}

async fn run_agent(url: String) -> Result<()> {
    let agent = PageAgent::new(PageState::watch_page(url).shared());
    serve_agent(agent, tokio::io::stdin(), tokio::io::stdout()).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref());

    let config = match WordjumpConfig::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Search(args) => run_search(config, args).await,
        Command::Agent { url } => run_agent(url).await,
    }
}
