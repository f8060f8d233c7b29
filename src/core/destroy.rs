use crate::config::ProjectConfig;
use crate::core::{tolerate_missing, Services};
use crate::domain::model::Item;
use crate::domain::ports::{ApiGateway, KeyValueStore, ObjectStore};
use crate::utils::error::Result;

/// What a teardown removed. Missing resources count as not deleted.
///
/// Repeated deploys leave several REST APIs, keys and usage plans sharing one
/// name, hence the counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    pub items_deleted: usize,
    pub table_deleted: bool,
    pub objects_deleted: usize,
    pub bucket_deleted: bool,
    pub usage_plans_deleted: usize,
    pub api_keys_deleted: usize,
    pub apis_deleted: usize,
}

pub struct ProjectDestroyer<O, K, A, I> {
    services: Services<O, K, A, I>,
    config: ProjectConfig,
}

impl<O, K, A, I> ProjectDestroyer<O, K, A, I>
where
    O: ObjectStore,
    K: KeyValueStore,
    A: ApiGateway,
{
    pub fn new(services: Services<O, K, A, I>, config: ProjectConfig) -> Self {
        Self { services, config }
    }

    pub async fn run(&self) -> Result<TeardownReport> {
        tracing::info!("🧨 Starting project deletion...");
        let mut report = TeardownReport::default();

        report.items_deleted = self.delete_all_items().await?;
        report.table_deleted = self.delete_table().await?;
        let (objects_deleted, bucket_deleted) = self.empty_and_delete_bucket().await?;
        report.objects_deleted = objects_deleted;
        report.bucket_deleted = bucket_deleted;
        self.delete_api(&mut report).await?;

        tracing::info!("✅ Project deleted successfully!");
        Ok(report)
    }

    async fn delete_all_items(&self) -> Result<usize> {
        let table = &self.config.table.name;
        let partition_key = &self.config.table.partition_key;
        tracing::info!("🗑️ Deleting all items from table {}...", table);

        let Some(items) = tolerate_missing(self.services.tables.scan(table).await)? else {
            return Ok(0);
        };
        if items.is_empty() {
            tracing::warn!("⚠️ WARNING: No items found in table");
            return Ok(0);
        }

        let mut deleted = 0;
        for item in items {
            let Some(id) = item.get(partition_key).cloned() else {
                tracing::warn!("⚠️ WARNING: Skipping item without {}", partition_key);
                continue;
            };
            let label = id.to_string();
            let mut key = Item::new();
            key.insert(partition_key.clone(), id);

            self.services.tables.delete_item(table, key).await?;
            tracing::info!("✅ Deleted item: {}", label);
            deleted += 1;
        }

        tracing::info!("✅ All items deleted from {}", table);
        Ok(deleted)
    }

    async fn delete_table(&self) -> Result<bool> {
        let table = &self.config.table.name;
        tracing::info!("🗑️ Deleting DynamoDB table: {}...", table);

        let deleted = tolerate_missing(self.services.tables.delete_table(table).await)?.is_some();
        if deleted {
            tracing::info!("✅ Table {} deleted successfully", table);
        }
        Ok(deleted)
    }

    async fn empty_and_delete_bucket(&self) -> Result<(usize, bool)> {
        let bucket = &self.config.bucket.name;
        tracing::info!("🗑️ Emptying and deleting S3 bucket: {}...", bucket);

        let Some(keys) = tolerate_missing(self.services.objects.list_object_keys(bucket).await)?
        else {
            return Ok((0, false));
        };

        if keys.is_empty() {
            tracing::warn!("⚠️ WARNING: No objects found in bucket");
        }
        for key in &keys {
            self.services.objects.delete_object(bucket, key).await?;
            tracing::info!("✅ Deleted object: {}", key);
        }

        let deleted = tolerate_missing(self.services.objects.delete_bucket(bucket).await)?.is_some();
        if deleted {
            tracing::info!("✅ Bucket {} deleted successfully", bucket);
        }
        Ok((keys.len(), deleted))
    }

    /// Detaches and removes every usage plan and API key of the project
    /// before the REST APIs themselves.
    async fn delete_api(&self, report: &mut TeardownReport) -> Result<()> {
        let api_name = &self.config.api.name;
        let api = &self.services.api;
        tracing::info!("🗑️ Deleting API Gateway: {}...", api_name);

        let api_ids = api.find_rest_apis(api_name).await?;

        let plan_name = &self.config.api.usage_plan.name;
        for plan in api.find_usage_plans(plan_name).await? {
            for (stage_api, stage) in &plan.stages {
                tolerate_missing(api.remove_usage_plan_stage(&plan.id, stage_api, stage).await)?;
            }
            if tolerate_missing(api.delete_usage_plan(&plan.id).await)?.is_some() {
                tracing::info!("✅ Usage plan {} ({}) deleted", plan_name, plan.id);
                report.usage_plans_deleted += 1;
            }
        }

        let key_name = self.config.api_key_name();
        for key_id in api.find_api_keys(&key_name).await? {
            if tolerate_missing(api.delete_api_key(&key_id).await)?.is_some() {
                tracing::info!("✅ API key {} ({}) deleted", key_name, key_id);
                report.api_keys_deleted += 1;
            }
        }

        if api_ids.is_empty() {
            tracing::warn!("⚠️ WARNING: API {} not found", api_name);
        }
        for api_id in api_ids {
            if tolerate_missing(api.delete_rest_api(&api_id).await)?.is_some() {
                tracing::info!("✅ API Gateway {} ({}) deleted successfully", api_name, api_id);
                report.apis_deleted += 1;
            }
        }

        Ok(())
    }
}
