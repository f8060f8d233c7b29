pub mod blueprint;
pub mod catalog;
pub mod checker;
pub mod deploy;
pub mod destroy;
pub mod table_lab;

use crate::adapters::apigateway::ApiGatewayService;
use crate::adapters::dynamodb::DynamoDbStore;
use crate::adapters::iam::IamIdentity;
use crate::adapters::s3::S3ObjectStore;
use crate::adapters::{AwsClients, InMemoryCloud};
pub use crate::domain::ports::{ApiGateway, IdentityService, KeyValueStore, ObjectStore};
pub use crate::utils::error::Result;

/// The four control planes a workflow talks to.
#[derive(Debug, Clone)]
pub struct Services<O, K, A, I> {
    pub objects: O,
    pub tables: K,
    pub api: A,
    pub identity: I,
}

pub type AwsServices = Services<S3ObjectStore, DynamoDbStore, ApiGatewayService, IamIdentity>;

pub type InMemoryServices = Services<InMemoryCloud, InMemoryCloud, InMemoryCloud, InMemoryCloud>;

impl From<AwsClients> for AwsServices {
    fn from(clients: AwsClients) -> Self {
        Self {
            objects: clients.object_store,
            tables: clients.tables,
            api: clients.api,
            identity: clients.identity,
        }
    }
}

impl From<&InMemoryCloud> for InMemoryServices {
    fn from(cloud: &InMemoryCloud) -> Self {
        Self {
            objects: cloud.clone(),
            tables: cloud.clone(),
            api: cloud.clone(),
            identity: cloud.clone(),
        }
    }
}

/// `NotFound` becomes a logged warning and `Ok(None)`.
pub(crate) fn tolerate_missing<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => {
            tracing::warn!("⚠️ WARNING: {}", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// `AlreadyExists` becomes a logged warning and `Ok(false)`; success is `Ok(true)`.
pub(crate) fn tolerate_existing(result: Result<()>) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(err) if err.is_already_exists() => {
            tracing::warn!("⚠️ WARNING: {}", err);
            Ok(false)
        }
        Err(err) => Err(err),
    }
}
