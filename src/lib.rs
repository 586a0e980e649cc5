//! gantry: LLM agent client for CAD-automation tool servers.
//!
//! Connects to a tool-providing child process over a JSON-RPC stdio
//! channel, advertises the discovered tools to an Anthropic model, and
//! drives the multi-turn tool-use loop until the model produces a final
//! answer. When the tool process is unreachable, recorded snapshots keep
//! the loop usable in a clearly flagged degraded mode.
//!
//! # Quick Start
//!
//! ```no_run
//! use gantry::config::GantryConfig;
//! use gantry::orchestrator::Orchestrator;
//!
//! # async fn example() -> gantry::error::Result<()> {
//! let config = GantryConfig::from_env();
//! let mut orchestrator = Orchestrator::connect(&config).await?;
//! let answer = orchestrator.process_query("What objects are in the document?").await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod prelude;
pub mod protocol;
pub mod provider;
pub mod tools;
pub mod types;
pub mod util;
