use crate::config::project::ProjectConfig;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "cloud-labs.toml";

#[derive(Debug, Clone, Parser)]
#[command(name = "cloud-labs")]
#[command(about = "Provision and tear down the ships catalog lab on AWS")]
pub struct Cli {
    /// Path to a TOML project configuration
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the region from the configuration
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit JSON log lines instead of the compact console format
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Run against an in-memory cloud and print the calls that would be made
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create the bucket, table and REST API, then seed them
    Deploy,
    /// Empty and delete everything `deploy` created
    Destroy,
    /// Call a deployed API and check its responses
    Check {
        /// Invoke URL printed by `deploy`
        #[arg(long, env = "CLOUD_LABS_API_URL")]
        url: String,

        /// API key value printed by `deploy`
        #[arg(long, env = "CLOUD_LABS_API_KEY")]
        api_key: String,
    },
}

impl Cli {
    /// Explicit `--config` wins, then `cloud-labs.toml` in the working
    /// directory, then the built-in defaults. `--region` applies last.
    pub fn project_config(&self) -> Result<ProjectConfig> {
        let config = match &self.config {
            Some(path) => ProjectConfig::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                ProjectConfig::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => ProjectConfig::default(),
        };
        Ok(config.with_region(self.region.clone()))
    }
}
