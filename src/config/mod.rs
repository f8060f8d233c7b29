#[cfg(feature = "cli")]
pub mod cli;
pub mod project;

#[cfg(feature = "cli")]
pub use cli::{Cli, Command};
pub use project::{ApiConfig, AssetConfig, BucketConfig, ProjectConfig, TableConfig, UsagePlanConfig};
