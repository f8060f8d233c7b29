//! In-process stand-in for the AWS control planes.
//!
//! Reproduces the existence rules the real services enforce (duplicate
//! bucket, missing table, method before integration, ...) and keeps a
//! journal of every call so a run can be inspected after the fact.

use crate::domain::model::{
    ApiKey, IntegrationResponseSpec, IntegrationSpec, Item, MethodResponseSpec, MethodSpec,
    ObjectUpload, RestApiSpec, TableSpec, TableState, UsagePlanRef, UsagePlanSpec,
};
use crate::domain::ports::{ApiGateway, IdentityService, KeyValueStore, ObjectStore};
use crate::utils::error::{LabError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct MethodState {
    pub method: Option<MethodSpec>,
    pub integration: Option<IntegrationSpec>,
    pub method_responses: Vec<MethodResponseSpec>,
    pub integration_responses: Vec<IntegrationResponseSpec>,
}

#[derive(Debug, Clone)]
struct ResourceState {
    path: String,
    methods: BTreeMap<String, MethodState>,
}

#[derive(Debug, Clone)]
struct RestApiState {
    name: String,
    resources: BTreeMap<String, ResourceState>,
    stages: Vec<String>,
}

#[derive(Debug, Clone)]
struct TableData {
    partition_key: String,
    items: BTreeMap<String, Item>,
}

#[derive(Debug, Clone)]
struct UsagePlanState {
    name: String,
    stages: Vec<(String, String)>,
    keys: Vec<String>,
}

#[derive(Debug, Default)]
struct CloudState {
    next_id: u64,
    journal: Vec<String>,
    failures: BTreeMap<String, String>,
    roles: BTreeMap<String, String>,
    buckets: BTreeMap<String, BTreeMap<String, ObjectUpload>>,
    tables: BTreeMap<String, TableData>,
    apis: BTreeMap<String, RestApiState>,
    api_keys: BTreeMap<String, String>,
    usage_plans: BTreeMap<String, UsagePlanState>,
}

impl CloudState {
    /// Journals the call and fails it when a failure was injected for `operation`.
    fn record(&mut self, service: &'static str, operation: &'static str, detail: &str) -> Result<()> {
        let entry = if detail.is_empty() {
            format!("{}:{}", service, operation)
        } else {
            format!("{}:{} {}", service, operation, detail)
        };
        self.journal.push(entry);

        match self.failures.get(operation) {
            Some(message) => Err(LabError::Cloud {
                service,
                operation,
                code: Some("InjectedFailure".to_string()),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{:06}", prefix, self.next_id)
    }

    fn api_mut(&mut self, api_id: &str) -> Result<&mut RestApiState> {
        self.apis
            .get_mut(api_id)
            .ok_or_else(|| LabError::not_found(format!("REST API {}", api_id)))
    }

    fn method_mut(
        &mut self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
    ) -> Result<&mut MethodState> {
        let api = self.api_mut(api_id)?;
        let resource = api
            .resources
            .get_mut(resource_id)
            .ok_or_else(|| LabError::not_found(format!("Resource {}", resource_id)))?;
        resource
            .methods
            .get_mut(http_method)
            .ok_or_else(|| LabError::not_found(format!("Method {} on {}", http_method, resource_id)))
    }

    fn table_mut(&mut self, table: &str) -> Result<&mut TableData> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| LabError::not_found(format!("Table {}", table)))
    }

    fn bucket_mut(&mut self, bucket: &str) -> Result<&mut BTreeMap<String, ObjectUpload>> {
        self.buckets
            .get_mut(bucket)
            .ok_or_else(|| LabError::not_found(format!("Bucket {}", bucket)))
    }
}

/// Cheap to clone; clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCloud {
    state: Arc<Mutex<CloudState>>,
}

fn partition_value(item: &Item, partition_key: &str) -> Result<String> {
    item.get(partition_key)
        .map(|value| value.to_string())
        .ok_or_else(|| {
            LabError::provisioning(format!("Item is missing its partition key '{}'", partition_key))
        })
}

impl InMemoryCloud {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CloudState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers an IAM role so `role_arn` can resolve it.
    pub fn with_role(self, role_name: &str, arn: &str) -> Self {
        self.lock()
            .roles
            .insert(role_name.to_string(), arn.to_string());
        self
    }

    /// Makes every later call to `operation` (e.g. `"CreateDeployment"`) fail.
    pub fn fail_on(self, operation: &str, message: &str) -> Self {
        self.lock()
            .failures
            .insert(operation.to_string(), message.to_string());
        self
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    pub fn journal(&self) -> Vec<String> {
        self.lock().journal.clone()
    }

    pub fn bucket_keys(&self, bucket: &str) -> Option<Vec<String>> {
        self.lock()
            .buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<ObjectUpload> {
        self.lock()
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key).cloned())
    }

    pub fn table_items(&self, table: &str) -> Option<Vec<Item>> {
        self.lock()
            .tables
            .get(table)
            .map(|data| data.items.values().cloned().collect())
    }

    pub fn rest_api_names(&self) -> Vec<String> {
        self.lock().apis.values().map(|api| api.name.clone()).collect()
    }

    pub fn resource_paths(&self, api_id: &str) -> Vec<String> {
        self.lock()
            .apis
            .get(api_id)
            .map(|api| api.resources.values().map(|r| r.path.clone()).collect())
            .unwrap_or_default()
    }

    pub fn method(&self, api_id: &str, path: &str, http_method: &str) -> Option<MethodState> {
        self.lock().apis.get(api_id).and_then(|api| {
            api.resources
                .values()
                .find(|resource| resource.path == path)
                .and_then(|resource| resource.methods.get(http_method).cloned())
        })
    }

    pub fn stages(&self, api_id: &str) -> Vec<String> {
        self.lock()
            .apis
            .get(api_id)
            .map(|api| api.stages.clone())
            .unwrap_or_default()
    }

    /// `(stages, key ids)` of the named usage plan.
    pub fn usage_plan(&self, name: &str) -> Option<(Vec<(String, String)>, Vec<String>)> {
        self.lock()
            .usage_plans
            .values()
            .find(|plan| plan.name == name)
            .map(|plan| (plan.stages.clone(), plan.keys.clone()))
    }

    pub fn api_key_names(&self) -> Vec<String> {
        self.lock().api_keys.values().cloned().collect()
    }
}

#[async_trait]
impl ObjectStore for InMemoryCloud {
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<()> {
        let mut state = self.lock();
        state.record("s3", "CreateBucket", &format!("{} ({})", bucket, region))?;
        if state.buckets.contains_key(bucket) {
            return Err(LabError::already_exists(format!("Bucket {}", bucket)));
        }
        state.buckets.insert(bucket.to_string(), BTreeMap::new());
        Ok(())
    }

    async fn put_object(&self, bucket: &str, object: ObjectUpload) -> Result<()> {
        let mut state = self.lock();
        state.record("s3", "PutObject", &format!("{}/{}", bucket, object.key))?;
        state.bucket_mut(bucket)?.insert(object.key.clone(), object);
        Ok(())
    }

    async fn list_object_keys(&self, bucket: &str) -> Result<Vec<String>> {
        let mut state = self.lock();
        state.record("s3", "ListObjectsV2", bucket)?;
        Ok(state.bucket_mut(bucket)?.keys().cloned().collect())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        let mut state = self.lock();
        state.record("s3", "DeleteObject", &format!("{}/{}", bucket, key))?;
        state.bucket_mut(bucket)?.remove(key);
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        let mut state = self.lock();
        state.record("s3", "DeleteBucket", bucket)?;
        if !state.bucket_mut(bucket)?.is_empty() {
            return Err(LabError::Cloud {
                service: "s3",
                operation: "DeleteBucket",
                code: Some("BucketNotEmpty".to_string()),
                message: format!("The bucket {} you tried to delete is not empty", bucket),
            });
        }
        state.buckets.remove(bucket);
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryCloud {
    async fn create_table(&self, table: &TableSpec) -> Result<()> {
        let mut state = self.lock();
        state.record(
            "dynamodb",
            "CreateTable",
            &format!("{} (hash key {})", table.name, table.partition_key),
        )?;
        if state.tables.contains_key(&table.name) {
            return Err(LabError::already_exists(format!("Table {}", table.name)));
        }
        state.tables.insert(
            table.name.clone(),
            TableData {
                partition_key: table.partition_key.clone(),
                items: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn wait_for_table(
        &self,
        table: &str,
        desired: TableState,
        max_wait: Duration,
    ) -> Result<()> {
        let mut state = self.lock();
        state.record("dynamodb", "DescribeTable", table)?;
        let exists = state.tables.contains_key(table);
        match (desired, exists) {
            (TableState::Active, true) | (TableState::Deleted, false) => Ok(()),
            _ => Err(LabError::Timeout {
                what: format!("table {} to become {}", table, desired),
                seconds: max_wait.as_secs(),
            }),
        }
    }

    async fn put_item(&self, table: &str, item: Item) -> Result<()> {
        let mut state = self.lock();
        state.record("dynamodb", "PutItem", table)?;
        let data = state.table_mut(table)?;
        let key = partition_value(&item, &data.partition_key)?;
        data.items.insert(key, item);
        Ok(())
    }

    async fn scan(&self, table: &str) -> Result<Vec<Item>> {
        let mut state = self.lock();
        state.record("dynamodb", "Scan", table)?;
        Ok(state.table_mut(table)?.items.values().cloned().collect())
    }

    async fn delete_item(&self, table: &str, key: Item) -> Result<()> {
        let mut state = self.lock();
        let data = state.table_mut(table);
        let partition_key = data.map(|d| d.partition_key.clone());
        let rendered = match &partition_key {
            Ok(name) => key.get(name).map(|v| v.to_string()).unwrap_or_default(),
            Err(_) => String::new(),
        };
        state.record("dynamodb", "DeleteItem", &format!("{} {}", table, rendered))?;
        let partition_key = partition_key?;
        let id = partition_value(&key, &partition_key)?;
        state.table_mut(table)?.items.remove(&id);
        Ok(())
    }

    async fn delete_table(&self, table: &str) -> Result<()> {
        let mut state = self.lock();
        state.record("dynamodb", "DeleteTable", table)?;
        state
            .tables
            .remove(table)
            .map(|_| ())
            .ok_or_else(|| LabError::not_found(format!("Table {}", table)))
    }
}

#[async_trait]
impl ApiGateway for InMemoryCloud {
    async fn create_rest_api(&self, spec: &RestApiSpec) -> Result<String> {
        let mut state = self.lock();
        state.record("apigateway", "CreateRestApi", &spec.name)?;
        let api_id = state.next_id("api");
        let root_id = state.next_id("res");

        let mut resources = BTreeMap::new();
        resources.insert(
            root_id,
            ResourceState {
                path: "/".to_string(),
                methods: BTreeMap::new(),
            },
        );
        state.apis.insert(
            api_id.clone(),
            RestApiState {
                name: spec.name.clone(),
                resources,
                stages: Vec::new(),
            },
        );
        Ok(api_id)
    }

    async fn find_rest_apis(&self, name: &str) -> Result<Vec<String>> {
        let mut state = self.lock();
        state.record("apigateway", "GetRestApis", "")?;
        Ok(state
            .apis
            .iter()
            .filter(|(_, api)| api.name == name)
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn root_resource_id(&self, api_id: &str) -> Result<String> {
        let mut state = self.lock();
        state.record("apigateway", "GetResources", api_id)?;
        state
            .api_mut(api_id)?
            .resources
            .iter()
            .find(|(_, resource)| resource.path == "/")
            .map(|(id, _)| id.clone())
            .ok_or_else(|| LabError::provisioning("No root resource found"))
    }

    async fn create_resource(
        &self,
        api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<String> {
        let mut state = self.lock();
        state.record("apigateway", "CreateResource", path_part)?;
        let resource_id = state.next_id("res");
        let api = state.api_mut(api_id)?;

        let parent_path = api
            .resources
            .get(parent_id)
            .map(|parent| parent.path.clone())
            .ok_or_else(|| LabError::not_found(format!("Resource {}", parent_id)))?;
        let path = if parent_path == "/" {
            format!("/{}", path_part)
        } else {
            format!("{}/{}", parent_path, path_part)
        };

        if api.resources.values().any(|resource| resource.path == path) {
            return Err(LabError::already_exists(format!("Resource {}", path)));
        }
        api.resources.insert(
            resource_id.clone(),
            ResourceState {
                path,
                methods: BTreeMap::new(),
            },
        );
        Ok(resource_id)
    }

    async fn put_method(&self, api_id: &str, resource_id: &str, method: &MethodSpec) -> Result<()> {
        let mut state = self.lock();
        state.record(
            "apigateway",
            "PutMethod",
            &format!("{} {}", method.http_method, resource_id),
        )?;
        let resource = state
            .api_mut(api_id)?
            .resources
            .get_mut(resource_id)
            .ok_or_else(|| LabError::not_found(format!("Resource {}", resource_id)))?;

        if resource.methods.contains_key(&method.http_method) {
            return Err(LabError::already_exists(format!(
                "Method {} on {}",
                method.http_method, resource.path
            )));
        }
        resource.methods.insert(
            method.http_method.clone(),
            MethodState {
                method: Some(method.clone()),
                ..MethodState::default()
            },
        );
        Ok(())
    }

    async fn put_integration(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
        integration: &IntegrationSpec,
    ) -> Result<()> {
        let mut state = self.lock();
        state.record(
            "apigateway",
            "PutIntegration",
            &format!("{} {}", http_method, resource_id),
        )?;
        state.method_mut(api_id, resource_id, http_method)?.integration = Some(integration.clone());
        Ok(())
    }

    async fn put_method_response(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
        response: &MethodResponseSpec,
    ) -> Result<()> {
        let mut state = self.lock();
        state.record(
            "apigateway",
            "PutMethodResponse",
            &format!("{} {} {}", http_method, resource_id, response.status_code),
        )?;
        state
            .method_mut(api_id, resource_id, http_method)?
            .method_responses
            .push(response.clone());
        Ok(())
    }

    async fn put_integration_response(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
        response: &IntegrationResponseSpec,
    ) -> Result<()> {
        let mut state = self.lock();
        state.record(
            "apigateway",
            "PutIntegrationResponse",
            &format!("{} {} {}", http_method, resource_id, response.status_code),
        )?;
        let method = state.method_mut(api_id, resource_id, http_method)?;
        if method.integration.is_none() {
            return Err(LabError::not_found(format!(
                "Integration {} on {}",
                http_method, resource_id
            )));
        }
        method.integration_responses.push(response.clone());
        Ok(())
    }

    async fn create_deployment(&self, api_id: &str, stage: &str) -> Result<()> {
        let mut state = self.lock();
        state.record("apigateway", "CreateDeployment", &format!("{} {}", api_id, stage))?;
        let api = state.api_mut(api_id)?;
        if api.resources.values().all(|resource| resource.methods.is_empty()) {
            return Err(LabError::Cloud {
                service: "apigateway",
                operation: "CreateDeployment",
                code: Some("BadRequestException".to_string()),
                message: "The REST API doesn't contain any methods".to_string(),
            });
        }
        if !api.stages.iter().any(|existing| existing == stage) {
            api.stages.push(stage.to_string());
        }
        Ok(())
    }

    async fn create_api_key(&self, name: &str, _description: &str) -> Result<ApiKey> {
        let mut state = self.lock();
        state.record("apigateway", "CreateApiKey", name)?;
        let id = state.next_id("key");
        let value = format!("{}-value", id);
        state.api_keys.insert(id.clone(), name.to_string());
        Ok(ApiKey {
            id,
            value: Some(value),
        })
    }

    async fn create_usage_plan(&self, plan: &UsagePlanSpec, api_id: &str) -> Result<String> {
        let mut state = self.lock();
        state.record(
            "apigateway",
            "CreateUsagePlan",
            &format!("{} {}:{}", plan.name, api_id, plan.stage),
        )?;
        let has_stage = state.api_mut(api_id)?.stages.contains(&plan.stage);
        if !has_stage {
            return Err(LabError::not_found(format!(
                "Stage {} of REST API {}",
                plan.stage, api_id
            )));
        }
        let id = state.next_id("plan");
        state.usage_plans.insert(
            id.clone(),
            UsagePlanState {
                name: plan.name.clone(),
                stages: vec![(api_id.to_string(), plan.stage.clone())],
                keys: Vec::new(),
            },
        );
        Ok(id)
    }

    async fn create_usage_plan_key(&self, usage_plan_id: &str, key_id: &str) -> Result<()> {
        let mut state = self.lock();
        state.record(
            "apigateway",
            "CreateUsagePlanKey",
            &format!("{} {}", usage_plan_id, key_id),
        )?;
        if !state.api_keys.contains_key(key_id) {
            return Err(LabError::not_found(format!("API key {}", key_id)));
        }
        let plan = state
            .usage_plans
            .get_mut(usage_plan_id)
            .ok_or_else(|| LabError::not_found(format!("Usage plan {}", usage_plan_id)))?;
        plan.keys.push(key_id.to_string());
        Ok(())
    }

    async fn delete_rest_api(&self, api_id: &str) -> Result<()> {
        let mut state = self.lock();
        state.record("apigateway", "DeleteRestApi", api_id)?;
        state
            .apis
            .remove(api_id)
            .map(|_| ())
            .ok_or_else(|| LabError::not_found(format!("REST API {}", api_id)))
    }

    async fn find_usage_plans(&self, name: &str) -> Result<Vec<UsagePlanRef>> {
        let mut state = self.lock();
        state.record("apigateway", "GetUsagePlans", "")?;
        Ok(state
            .usage_plans
            .iter()
            .filter(|(_, plan)| plan.name == name)
            .map(|(id, plan)| UsagePlanRef {
                id: id.clone(),
                stages: plan.stages.clone(),
            })
            .collect())
    }

    async fn remove_usage_plan_stage(
        &self,
        usage_plan_id: &str,
        api_id: &str,
        stage: &str,
    ) -> Result<()> {
        let mut state = self.lock();
        state.record(
            "apigateway",
            "UpdateUsagePlan",
            &format!("{} remove {}:{}", usage_plan_id, api_id, stage),
        )?;
        let plan = state
            .usage_plans
            .get_mut(usage_plan_id)
            .ok_or_else(|| LabError::not_found(format!("Usage plan {}", usage_plan_id)))?;
        plan.stages
            .retain(|(plan_api, plan_stage)| !(plan_api == api_id && plan_stage == stage));
        Ok(())
    }

    async fn delete_usage_plan(&self, usage_plan_id: &str) -> Result<()> {
        let mut state = self.lock();
        state.record("apigateway", "DeleteUsagePlan", usage_plan_id)?;
        let plan = state
            .usage_plans
            .get(usage_plan_id)
            .ok_or_else(|| LabError::not_found(format!("Usage plan {}", usage_plan_id)))?;
        if !plan.stages.is_empty() {
            return Err(LabError::Cloud {
                service: "apigateway",
                operation: "DeleteUsagePlan",
                code: Some("BadRequestException".to_string()),
                message: "Usage plan still has API stages attached".to_string(),
            });
        }
        state.usage_plans.remove(usage_plan_id);
        Ok(())
    }

    async fn find_api_keys(&self, name: &str) -> Result<Vec<String>> {
        let mut state = self.lock();
        state.record("apigateway", "GetApiKeys", name)?;
        Ok(state
            .api_keys
            .iter()
            .filter(|(_, key_name)| key_name.as_str() == name)
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn delete_api_key(&self, key_id: &str) -> Result<()> {
        let mut state = self.lock();
        state.record("apigateway", "DeleteApiKey", key_id)?;
        state
            .api_keys
            .remove(key_id)
            .map(|_| ())
            .ok_or_else(|| LabError::not_found(format!("API key {}", key_id)))?;
        for plan in state.usage_plans.values_mut() {
            plan.keys.retain(|key| key != key_id);
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityService for InMemoryCloud {
    async fn role_arn(&self, role_name: &str) -> Result<String> {
        let mut state = self.lock();
        state.record("iam", "GetRole", role_name)?;
        state
            .roles
            .get(role_name)
            .cloned()
            .ok_or_else(|| LabError::not_found(format!("IAM role {}", role_name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::AttributeValue;

    fn item(id: &str) -> Item {
        let mut item = Item::new();
        item.insert("id".to_string(), AttributeValue::S(id.to_string()));
        item
    }

    #[tokio::test]
    async fn test_bucket_rules() {
        let cloud = InMemoryCloud::new();
        cloud.create_bucket("ships", "eu-west-1").await.unwrap();

        let err = cloud.create_bucket("ships", "eu-west-1").await.unwrap_err();
        assert!(err.is_already_exists());

        cloud
            .put_object(
                "ships",
                ObjectUpload {
                    key: "a.jpg".to_string(),
                    body: vec![1],
                    content_type: "image/jpeg".to_string(),
                },
            )
            .await
            .unwrap();
        let err = cloud.delete_bucket("ships").await.unwrap_err();
        assert!(matches!(err, LabError::Cloud { .. }));

        cloud.delete_object("ships", "a.jpg").await.unwrap();
        cloud.delete_bucket("ships").await.unwrap();
        assert!(cloud.delete_bucket("ships").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_table_items_are_keyed_by_partition_key() {
        let cloud = InMemoryCloud::new();
        let spec = TableSpec {
            name: "ShipsTable".to_string(),
            partition_key: "id".to_string(),
        };
        cloud.create_table(&spec).await.unwrap();
        cloud.put_item("ShipsTable", item("b-001")).await.unwrap();
        cloud.put_item("ShipsTable", item("b-001")).await.unwrap();
        cloud.put_item("ShipsTable", item("b-002")).await.unwrap();

        assert_eq!(cloud.scan("ShipsTable").await.unwrap().len(), 2);

        cloud.delete_item("ShipsTable", item("b-001")).await.unwrap();
        assert_eq!(cloud.table_items("ShipsTable").unwrap().len(), 1);

        let missing_key = Item::new();
        assert!(cloud.put_item("ShipsTable", missing_key).await.is_err());
        assert!(cloud.scan("Other").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_resources_build_paths_from_parents() {
        let cloud = InMemoryCloud::new();
        let api_id = cloud
            .create_rest_api(&RestApiSpec {
                name: "ShipsAPI".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        let root = cloud.root_resource_id(&api_id).await.unwrap();
        let ships = cloud.create_resource(&api_id, &root, "ships").await.unwrap();
        cloud.create_resource(&api_id, &ships, "photo").await.unwrap();

        let paths = cloud.resource_paths(&api_id);
        assert!(paths.contains(&"/ships".to_string()));
        assert!(paths.contains(&"/ships/photo".to_string()));

        let err = cloud.create_resource(&api_id, &root, "ships").await.unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_injected_failure_is_journaled() {
        let cloud = InMemoryCloud::new().fail_on("GetRole", "access denied");
        let err = cloud.role_arn("APIGatewayS3ServiceRole").await.unwrap_err();

        assert!(matches!(err, LabError::Cloud { operation: "GetRole", .. }));
        assert_eq!(cloud.journal(), vec!["iam:GetRole APIGatewayS3ServiceRole"]);
    }
}
