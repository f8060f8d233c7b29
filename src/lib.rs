pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{Cli, Command};

pub use adapters::{AwsClients, InMemoryCloud};
pub use config::ProjectConfig;
pub use crate::core::{
    deploy::{DeploymentReport, ProjectDeployer},
    destroy::{ProjectDestroyer, TeardownReport},
    Services,
};
pub use utils::error::{LabError, Result};
