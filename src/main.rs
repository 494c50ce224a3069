//! taskwait - wait for server task(s) to finish

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use taskwait::{
    config::AppConfig, input, logging, ServerClient, TaskPresenter, WaitEngine, WaitOptions,
};

/// Wait for a provided list of task(s) to finish
#[derive(Parser, Debug)]
#[command(name = "taskwait")]
#[command(version)]
#[command(about = "Wait for task(s) to finish", long_about = None)]
#[command(after_help = "Example:\n  $ taskwait ServerTasks-1234\n  $ echo ServerTasks-1234 | taskwait --progress")]
struct Args {
    /// Task IDs to wait for (more can be piped through stdin)
    task_ids: Vec<String>,

    /// Duration to wait (in seconds) before stopping execution
    #[arg(long)]
    timeout: Option<u64>,

    /// Show detailed progress of the tasks
    #[arg(long)]
    progress: bool,

    /// Configuration file path (overrides defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Server URL (overrides config and OCTOPUS_URL)
    #[arg(long)]
    server: Option<String>,

    /// API key (overrides config and OCTOPUS_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Space ID (overrides config and OCTOPUS_SPACE)
    #[arg(long)]
    space: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    let mut config = AppConfig::load(args.config.as_deref())?;

    // CLI flags win over file and environment
    if let Some(server) = args.server {
        config.server_url = Some(server);
    }
    if let Some(key) = args.api_key {
        config.api_key = Some(key);
    }
    if let Some(space) = args.space {
        config.space_id = space;
    }
    config.validate()?;

    let task_ids = input::collect_task_ids(args.task_ids, input::read_values_from_pipe()?);
    let options = WaitOptions {
        timeout: Duration::from_secs(args.timeout.unwrap_or(config.wait_timeout_secs)),
        show_progress: args.progress,
    };

    let client = ServerClient::from_config(&config)?;
    let engine = WaitEngine::new(Arc::new(client), TaskPresenter::new(std::io::stdout()));
    engine.wait(&task_ids, &options).await?;

    Ok(())
}
