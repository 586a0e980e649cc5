//! gantry CLI binary entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gantry::cli::{ChatArgs, Cli, Commands, Job, WorkerArgs};
use gantry::config::{GantryConfig, ServerConfig};
use gantry::orchestrator::Orchestrator;
use gantry::tools::{connect_or_fallback, SessionMode, ToolBackend};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gantry=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Chat(args) => handle_chat(args).await,
        Commands::Worker(args) => handle_worker(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn apply_server_override(config: &mut GantryConfig, server: Option<String>) {
    if let Some(raw) = server {
        config.server = ServerConfig::parse(&raw);
    }
}

async fn handle_chat(args: ChatArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = GantryConfig::from_env();
    apply_server_override(&mut config, args.server);
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(max_turns) = args.max_turns {
        config.max_turns = max_turns;
    }
    if args.offline {
        config.offline = true;
    }

    let mut orchestrator = Orchestrator::connect(&config).await?;
    if orchestrator.mode() == SessionMode::Degraded {
        tracing::warn!("running in degraded mode from recorded snapshots");
    }

    let run = orchestrator.run(&args.query).await;
    orchestrator.shutdown().await?;
    let report = run?;

    println!("{}", report.text);
    Ok(())
}

async fn handle_worker(args: WorkerArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = GantryConfig::from_env();
    apply_server_override(&mut config, args.server);

    let raw = std::fs::read_to_string(&args.input)?;
    let job: Job = serde_json::from_str(&raw)?;

    let mut backend = connect_or_fallback(&config).await?;

    // The output file carries the raw protocol response shape; it feeds an
    // analysis harness, not the model, so no sanitation happens here.
    let outcome = match job {
        Job::GetTools => {
            let tools = backend.list_tools().await;
            tools.map(|tools| serde_json::json!({ "tools": tools }))
        }
        Job::UseTool {
            tool_name,
            tool_args,
        } => backend
            .call_tool(&tool_name, tool_args)
            .await
            .and_then(|result| Ok(serde_json::to_value(result)?)),
    };

    backend.shutdown().await?;
    let value = outcome?;
    std::fs::write(&args.output, serde_json::to_string_pretty(&value)?)?;
    tracing::info!(output = %args.output.display(), "job complete");
    Ok(())
}
