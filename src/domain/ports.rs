use crate::domain::model::{
    ApiKey, IntegrationResponseSpec, IntegrationSpec, Item, MethodResponseSpec, MethodSpec,
    ObjectUpload, RestApiSpec, TableSpec, TableState, UsagePlanRef, UsagePlanSpec,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Object storage (S3).
///
/// `create_bucket` fails with `AlreadyExists` when the caller already owns the
/// bucket; the other calls fail with `NotFound` when the bucket is missing.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<()>;
    async fn put_object(&self, bucket: &str, object: ObjectUpload) -> Result<()>;
    /// Every key in the bucket, across all listing pages.
    async fn list_object_keys(&self, bucket: &str) -> Result<Vec<String>>;
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;
}

/// Key-value tables (DynamoDB).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn create_table(&self, table: &TableSpec) -> Result<()>;
    async fn wait_for_table(&self, table: &str, state: TableState, max_wait: Duration)
        -> Result<()>;
    async fn put_item(&self, table: &str, item: Item) -> Result<()>;
    /// Every item in the table, across all scan pages.
    async fn scan(&self, table: &str) -> Result<Vec<Item>>;
    async fn delete_item(&self, table: &str, key: Item) -> Result<()>;
    async fn delete_table(&self, table: &str) -> Result<()>;
}

/// REST API front-end (API Gateway).
///
/// Names are not unique in API Gateway, so the `find_*` lookups return every
/// match.
#[async_trait]
pub trait ApiGateway: Send + Sync {
    async fn create_rest_api(&self, spec: &RestApiSpec) -> Result<String>;
    async fn find_rest_apis(&self, name: &str) -> Result<Vec<String>>;
    async fn root_resource_id(&self, api_id: &str) -> Result<String>;
    async fn create_resource(&self, api_id: &str, parent_id: &str, path_part: &str)
        -> Result<String>;
    async fn put_method(&self, api_id: &str, resource_id: &str, method: &MethodSpec)
        -> Result<()>;
    async fn put_integration(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
        integration: &IntegrationSpec,
    ) -> Result<()>;
    async fn put_method_response(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
        response: &MethodResponseSpec,
    ) -> Result<()>;
    async fn put_integration_response(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
        response: &IntegrationResponseSpec,
    ) -> Result<()>;
    async fn create_deployment(&self, api_id: &str, stage: &str) -> Result<()>;
    async fn create_api_key(&self, name: &str, description: &str) -> Result<ApiKey>;
    async fn create_usage_plan(&self, plan: &UsagePlanSpec, api_id: &str) -> Result<String>;
    async fn create_usage_plan_key(&self, usage_plan_id: &str, key_id: &str) -> Result<()>;
    async fn delete_rest_api(&self, api_id: &str) -> Result<()>;
    async fn find_usage_plans(&self, name: &str) -> Result<Vec<UsagePlanRef>>;
    async fn remove_usage_plan_stage(&self, usage_plan_id: &str, api_id: &str, stage: &str)
        -> Result<()>;
    async fn delete_usage_plan(&self, usage_plan_id: &str) -> Result<()>;
    async fn find_api_keys(&self, name: &str) -> Result<Vec<String>>;
    async fn delete_api_key(&self, key_id: &str) -> Result<()>;
}

/// Identity lookups (IAM).
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn role_arn(&self, role_name: &str) -> Result<String>;
}
