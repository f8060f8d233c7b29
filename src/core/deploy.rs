use crate::config::ProjectConfig;
use crate::core::blueprint::{self, ApiBlueprint, RoleArns};
use crate::core::{catalog, tolerate_existing, Services};
use crate::domain::model::{EndpointSpec, TableState};
use crate::domain::ports::{ApiGateway, IdentityService, KeyValueStore, ObjectStore};
use crate::utils::error::{LabError, Result};
use std::collections::BTreeMap;

/// What a successful deployment produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentReport {
    pub api_id: String,
    pub api_url: String,
    pub api_key_id: String,
    pub api_key_value: Option<String>,
    pub usage_plan_id: String,
    pub objects_uploaded: usize,
    pub items_inserted: usize,
}

pub struct ProjectDeployer<O, K, A, I> {
    services: Services<O, K, A, I>,
    config: ProjectConfig,
}

impl<O, K, A, I> ProjectDeployer<O, K, A, I>
where
    O: ObjectStore,
    K: KeyValueStore,
    A: ApiGateway,
    I: IdentityService,
{
    pub fn new(services: Services<O, K, A, I>, config: ProjectConfig) -> Self {
        Self { services, config }
    }

    /// Bucket, assets, table, catalog, then the REST API. Each step runs only
    /// after the previous one succeeded.
    pub async fn run(&self) -> Result<DeploymentReport> {
        tracing::info!("🚀 Starting project deployment...");

        self.create_bucket().await?;
        let objects_uploaded = self.upload_assets().await?;

        self.create_table().await?;
        let items_inserted = self.insert_catalog().await?;

        let mut report = self.create_api().await?;
        report.objects_uploaded = objects_uploaded;
        report.items_inserted = items_inserted;

        tracing::info!("✅ Project deployed successfully!");
        Ok(report)
    }

    async fn create_bucket(&self) -> Result<()> {
        let bucket = &self.config.bucket.name;
        tracing::info!("🪣 Creating S3 bucket: {}...", bucket);

        let created = tolerate_existing(
            self.services
                .objects
                .create_bucket(bucket, self.config.region())
                .await,
        )?;
        if created {
            tracing::info!("✅ Bucket {} created successfully", bucket);
        }
        Ok(())
    }

    async fn upload_assets(&self) -> Result<usize> {
        tracing::info!("📤 Uploading images to S3...");
        let assets_dir = self.config.assets_dir();

        for asset in &self.config.bucket.objects {
            let upload = catalog::read_asset(&assets_dir, asset)?;
            self.services
                .objects
                .put_object(&self.config.bucket.name, upload)
                .await?;
            tracing::info!("✅ Uploaded {} as {}", asset.file, asset.key);
        }

        Ok(self.config.bucket.objects.len())
    }

    async fn create_table(&self) -> Result<()> {
        let table = self.config.table_spec();
        tracing::info!("📋 Creating DynamoDB table: {}...", table.name);

        let created = tolerate_existing(self.services.tables.create_table(&table).await)?;
        if created {
            tracing::info!("✅ Table {} created successfully", table.name);
            tracing::info!("⏳ Waiting for table to be active...");
            self.services
                .tables
                .wait_for_table(&table.name, TableState::Active, self.config.table_wait())
                .await?;
        }
        Ok(())
    }

    async fn insert_catalog(&self) -> Result<usize> {
        tracing::info!("🚢 Inserting ships data into DynamoDB...");
        let partition_key = &self.config.table.partition_key;
        let items = catalog::load_catalog(&self.config.seed_file(), partition_key)?;
        let count = items.len();

        for item in items {
            let label = catalog::item_label(&item, partition_key);
            self.services
                .tables
                .put_item(&self.config.table.name, item)
                .await?;
            tracing::info!("✅ Inserted ship: {}", label);
        }

        Ok(count)
    }

    async fn create_api(&self) -> Result<DeploymentReport> {
        tracing::info!("🌐 Creating API Gateway...");
        let api_name = &self.config.api.name;

        let existing = self.services.api.find_rest_apis(api_name).await?;
        if !existing.is_empty() {
            tracing::warn!(
                "⚠️ WARNING: {} REST API(s) named {} already exist; creating another one",
                existing.len(),
                api_name
            );
        }

        let api_id = self
            .services
            .api
            .create_rest_api(&self.config.rest_api_spec())
            .await?;
        tracing::info!("✅ API Gateway created with ID: {}", api_id);

        match self.configure_api(&api_id).await {
            Ok(report) => Ok(report),
            Err(err) => {
                self.cleanup_api(&api_id).await;
                Err(err)
            }
        }
    }

    /// Single best-effort removal of a half-configured API; never fails the run.
    async fn cleanup_api(&self, api_id: &str) {
        tracing::warn!("🧹 Attempting cleanup of REST API {}...", api_id);
        match self.services.api.delete_rest_api(api_id).await {
            Ok(()) => tracing::info!("✅ REST API {} removed", api_id),
            Err(cleanup_err) => {
                tracing::error!("❌ Cleanup failed: {}", cleanup_err);
                tracing::warn!(
                    "⚠️ Please delete REST API {} manually via the AWS console",
                    api_id
                );
            }
        }
    }

    async fn configure_api(&self, api_id: &str) -> Result<DeploymentReport> {
        let root_id = self.services.api.root_resource_id(api_id).await?;

        tracing::info!("🔑 Retrieving IAM role ARNs...");
        let roles = RoleArns {
            dynamodb: self.role_arn(&self.config.api.dynamodb_role).await?,
            s3: self.role_arn(&self.config.api.s3_role).await?,
        };

        let blueprint = blueprint::ships_api(&self.config, &roles);
        let resource_ids = self.create_resources(api_id, root_id, &blueprint).await?;

        for endpoint in &blueprint.endpoints {
            tracing::info!("⚙️ Configuring {} endpoint...", endpoint.label());
            self.configure_endpoint(api_id, &resource_ids, endpoint).await?;
            tracing::info!("✅ {} endpoint configured", endpoint.label());
        }

        for preflight in &blueprint.cors {
            tracing::debug!("Enabling CORS on {}", preflight.resource_path);
            self.configure_endpoint(api_id, &resource_ids, preflight).await?;
        }

        let stage = &self.config.api.stage;
        tracing::info!("📦 Deploying API to stage {}...", stage);
        self.services.api.create_deployment(api_id, stage).await?;

        tracing::info!("🔐 Creating API Key...");
        let api_key = self
            .services
            .api
            .create_api_key(
                &self.config.api_key_name(),
                &format!("API Key for {}", self.config.api.name),
            )
            .await?;
        tracing::info!("✅ API Key created: {}", api_key.id);
        if let Some(value) = &api_key.value {
            tracing::info!("🔑 API Key Value: {}", value);
        }

        tracing::info!("📈 Creating Usage Plan...");
        let usage_plan_id = self
            .services
            .api
            .create_usage_plan(&self.config.usage_plan_spec(), api_id)
            .await?;
        tracing::info!("✅ Usage Plan created: {}", usage_plan_id);

        self.services
            .api
            .create_usage_plan_key(&usage_plan_id, &api_key.id)
            .await?;
        tracing::info!("✅ API Key associated with Usage Plan");

        let api_url = self.config.invoke_url(api_id);
        tracing::info!("✅ API deployed successfully!");
        tracing::info!("🔗 API URL: {}", api_url);

        Ok(DeploymentReport {
            api_id: api_id.to_string(),
            api_url,
            api_key_id: api_key.id,
            api_key_value: api_key.value,
            usage_plan_id,
            objects_uploaded: 0,
            items_inserted: 0,
        })
    }

    async fn role_arn(&self, role_name: &str) -> Result<String> {
        self.services
            .identity
            .role_arn(role_name)
            .await
            .map_err(|err| {
                LabError::provisioning(format!(
                    "Failed to get role ARN for {}. Make sure the role exists. ({})",
                    role_name, err
                ))
            })
    }

    /// Creates every blueprint resource and returns path -> resource id,
    /// including `/` for the root.
    async fn create_resources(
        &self,
        api_id: &str,
        root_id: String,
        blueprint: &ApiBlueprint,
    ) -> Result<BTreeMap<String, String>> {
        let mut ids = BTreeMap::new();
        ids.insert("/".to_string(), root_id);

        for path in &blueprint.resources {
            let (parent, part) = blueprint::split_resource_path(path);
            let parent_id = ids.get(parent).cloned().ok_or_else(|| {
                LabError::provisioning(format!("Parent of {} was not created", path))
            })?;
            let id = self
                .services
                .api
                .create_resource(api_id, &parent_id, part)
                .await?;
            tracing::debug!("Created {} resource ({})", path, id);
            ids.insert(path.clone(), id);
        }

        Ok(ids)
    }

    async fn configure_endpoint(
        &self,
        api_id: &str,
        resource_ids: &BTreeMap<String, String>,
        endpoint: &EndpointSpec,
    ) -> Result<()> {
        let resource_id = resource_ids.get(&endpoint.resource_path).ok_or_else(|| {
            LabError::provisioning(format!("Unknown resource {}", endpoint.resource_path))
        })?;
        let http_method = &endpoint.method.http_method;
        let api = &self.services.api;

        api.put_method(api_id, resource_id, &endpoint.method).await?;
        api.put_integration(api_id, resource_id, http_method, &endpoint.integration)
            .await?;
        api.put_method_response(api_id, resource_id, http_method, &endpoint.method_response)
            .await?;
        api.put_integration_response(
            api_id,
            resource_id,
            http_method,
            &endpoint.integration_response,
        )
        .await?;
        Ok(())
    }
}
