use crate::adapters::apigateway::ApiGatewayService;
use crate::adapters::dynamodb::DynamoDbStore;
use crate::adapters::iam::IamIdentity;
use crate::adapters::s3::S3ObjectStore;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::config::Region;

/// One client per service, all built from the same SDK configuration.
#[derive(Debug, Clone)]
pub struct AwsClients {
    pub object_store: S3ObjectStore,
    pub tables: DynamoDbStore,
    pub api: ApiGatewayService,
    pub identity: IamIdentity,
}

impl AwsClients {
    /// Resolves credentials through the default chain (env, profile, SSO)
    /// and pins every client to `region`.
    pub async fn load(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        tracing::debug!(
            "Loaded AWS configuration for region {:?}",
            config.region().map(|r| r.as_ref().to_string())
        );
        Self::from_config(&config)
    }

    pub fn from_config(config: &SdkConfig) -> Self {
        Self {
            object_store: S3ObjectStore::new(aws_sdk_s3::Client::new(config)),
            tables: DynamoDbStore::new(aws_sdk_dynamodb::Client::new(config)),
            api: ApiGatewayService::new(aws_sdk_apigateway::Client::new(config)),
            identity: IamIdentity::new(aws_sdk_iam::Client::new(config)),
        }
    }
}
