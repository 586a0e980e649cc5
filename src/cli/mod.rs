//! CLI entry point for gantry.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Deserialize;

/// gantry CLI
#[derive(Parser, Debug)]
#[command(name = "gantry", version, about = "LLM agent client for CAD-automation tool servers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a query through the tool-use loop
    Chat(ChatArgs),
    /// Execute one protocol operation described by a job file
    Worker(WorkerArgs),
}

/// Arguments for `gantry chat`.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// The query to process
    pub query: String,

    /// Tool server command line, e.g. "python server.py"
    #[arg(long)]
    pub server: Option<String>,

    /// Model identifier override
    #[arg(long)]
    pub model: Option<String>,

    /// Cap on model round-trips
    #[arg(long)]
    pub max_turns: Option<usize>,

    /// Skip the live connection and run from recorded snapshots
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for `gantry worker`.
#[derive(Parser, Debug)]
pub struct WorkerArgs {
    /// Job file path
    #[arg(long, default_value = "input.json")]
    pub input: PathBuf,

    /// Output file path
    #[arg(long, default_value = "output.json")]
    pub output: PathBuf,

    /// Tool server command line, e.g. "python server.py"
    #[arg(long)]
    pub server: Option<String>,
}

/// A job as described by a worker input file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "job", rename_all = "kebab-case")]
pub enum Job {
    /// Fetch the tool listing.
    GetTools,
    /// Invoke one tool.
    UseTool {
        tool_name: String,
        #[serde(default)]
        tool_args: serde_json::Value,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_tools_job_parses() {
        let job: Job = serde_json::from_value(json!({"job": "get-tools"})).unwrap();
        assert_eq!(job, Job::GetTools);
    }

    #[test]
    fn use_tool_job_parses_with_args() {
        let job: Job = serde_json::from_value(json!({
            "job": "use-tool",
            "tool_name": "create_object",
            "tool_args": {"type": "box"}
        }))
        .unwrap();
        assert_eq!(
            job,
            Job::UseTool {
                tool_name: "create_object".into(),
                tool_args: json!({"type": "box"}),
            }
        );
    }

    #[test]
    fn use_tool_args_default_to_null() {
        let job: Job = serde_json::from_value(json!({
            "job": "use-tool",
            "tool_name": "get_document_info"
        }))
        .unwrap();
        assert!(matches!(
            job,
            Job::UseTool { tool_args, .. } if tool_args.is_null()
        ));
    }

    #[test]
    fn unknown_job_is_rejected() {
        let err = serde_json::from_value::<Job>(json!({"job": "explode"}));
        assert!(err.is_err());
    }
}
