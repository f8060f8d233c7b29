use crate::adapters::{classify, hash_map};
use crate::domain::model::{
    ApiKey, IntegrationKind, IntegrationResponseSpec, IntegrationSpec, MethodResponseSpec,
    MethodSpec, RestApiSpec, UsagePlanRef, UsagePlanSpec,
};
use crate::domain::ports::ApiGateway;
use crate::utils::error::{LabError, Result};
use async_trait::async_trait;
use aws_sdk_apigateway::types::{
    ApiStage, EndpointConfiguration, EndpointType, IntegrationType, Op, PatchOperation,
    QuotaPeriodType, QuotaSettings, ThrottleSettings,
};
use aws_sdk_apigateway::Client as ApiGatewayClient;

const SERVICE: &str = "apigateway";
const ALREADY_EXISTS: &[&str] = &["ConflictException"];
const NOT_FOUND: &[&str] = &["NotFoundException"];
const PAGE_SIZE: i32 = 500;

#[derive(Debug, Clone)]
pub struct ApiGatewayService {
    client: ApiGatewayClient,
}

impl ApiGatewayService {
    pub fn new(client: ApiGatewayClient) -> Self {
        Self { client }
    }
}

fn missing(operation: &str, field: &str) -> LabError {
    LabError::provisioning(format!("{} response did not include {}", operation, field))
}

fn integration_type(kind: IntegrationKind) -> IntegrationType {
    match kind {
        IntegrationKind::Aws => IntegrationType::Aws,
        IntegrationKind::Mock => IntegrationType::Mock,
    }
}

#[async_trait]
impl ApiGateway for ApiGatewayService {
    async fn create_rest_api(&self, spec: &RestApiSpec) -> Result<String> {
        let output = self
            .client
            .create_rest_api()
            .name(&spec.name)
            .description(&spec.description)
            .endpoint_configuration(
                EndpointConfiguration::builder()
                    .types(EndpointType::Regional)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "CreateRestApi",
                    &format!("REST API {}", spec.name),
                    e,
                    ALREADY_EXISTS,
                    NOT_FOUND,
                )
            })?;

        output
            .id()
            .map(str::to_string)
            .ok_or_else(|| missing("CreateRestApi", "an API id"))
    }

    async fn find_rest_apis(&self, name: &str) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut position: Option<String> = None;

        loop {
            let output = self
                .client
                .get_rest_apis()
                .limit(PAGE_SIZE)
                .set_position(position.take())
                .send()
                .await
                .map_err(|e| classify(SERVICE, "GetRestApis", "REST APIs", e, &[], &[]))?;

            ids.extend(
                output
                    .items()
                    .iter()
                    .filter(|api| api.name() == Some(name))
                    .filter_map(|api| api.id().map(str::to_string)),
            );

            match output.position() {
                Some(next) => position = Some(next.to_string()),
                None => return Ok(ids),
            }
        }
    }

    async fn root_resource_id(&self, api_id: &str) -> Result<String> {
        let output = self
            .client
            .get_resources()
            .rest_api_id(api_id)
            .limit(PAGE_SIZE)
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "GetResources",
                    &format!("REST API {}", api_id),
                    e,
                    &[],
                    NOT_FOUND,
                )
            })?;

        output
            .items()
            .iter()
            .find(|resource| resource.path() == Some("/"))
            .and_then(|resource| resource.id())
            .map(str::to_string)
            .ok_or_else(|| LabError::provisioning("No root resource found"))
    }

    async fn create_resource(
        &self,
        api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<String> {
        let output = self
            .client
            .create_resource()
            .rest_api_id(api_id)
            .parent_id(parent_id)
            .path_part(path_part)
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "CreateResource",
                    &format!("Resource {}", path_part),
                    e,
                    ALREADY_EXISTS,
                    NOT_FOUND,
                )
            })?;

        output
            .id()
            .map(str::to_string)
            .ok_or_else(|| missing("CreateResource", "a resource id"))
    }

    async fn put_method(&self, api_id: &str, resource_id: &str, method: &MethodSpec) -> Result<()> {
        self.client
            .put_method()
            .rest_api_id(api_id)
            .resource_id(resource_id)
            .http_method(&method.http_method)
            .authorization_type("NONE")
            .api_key_required(method.api_key_required)
            .set_request_parameters(hash_map(&method.request_parameters))
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "PutMethod",
                    &format!("Method {} on {}", method.http_method, resource_id),
                    e,
                    ALREADY_EXISTS,
                    NOT_FOUND,
                )
            })?;
        Ok(())
    }

    async fn put_integration(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
        integration: &IntegrationSpec,
    ) -> Result<()> {
        self.client
            .put_integration()
            .rest_api_id(api_id)
            .resource_id(resource_id)
            .http_method(http_method)
            .r#type(integration_type(integration.kind))
            .set_integration_http_method(integration.integration_http_method.clone())
            .set_uri(integration.uri.clone())
            .set_credentials(integration.credentials.clone())
            .set_request_parameters(hash_map(&integration.request_parameters))
            .set_request_templates(hash_map(&integration.request_templates))
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "PutIntegration",
                    &format!("Method {} on {}", http_method, resource_id),
                    e,
                    &[],
                    NOT_FOUND,
                )
            })?;
        Ok(())
    }

    async fn put_method_response(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
        response: &MethodResponseSpec,
    ) -> Result<()> {
        self.client
            .put_method_response()
            .rest_api_id(api_id)
            .resource_id(resource_id)
            .http_method(http_method)
            .status_code(&response.status_code)
            .set_response_parameters(hash_map(&response.response_parameters))
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "PutMethodResponse",
                    &format!("Method {} on {}", http_method, resource_id),
                    e,
                    ALREADY_EXISTS,
                    NOT_FOUND,
                )
            })?;
        Ok(())
    }

    async fn put_integration_response(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
        response: &IntegrationResponseSpec,
    ) -> Result<()> {
        self.client
            .put_integration_response()
            .rest_api_id(api_id)
            .resource_id(resource_id)
            .http_method(http_method)
            .status_code(&response.status_code)
            .set_response_parameters(hash_map(&response.response_parameters))
            .set_response_templates(hash_map(&response.response_templates))
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "PutIntegrationResponse",
                    &format!("Integration {} on {}", http_method, resource_id),
                    e,
                    &[],
                    NOT_FOUND,
                )
            })?;
        Ok(())
    }

    async fn create_deployment(&self, api_id: &str, stage: &str) -> Result<()> {
        self.client
            .create_deployment()
            .rest_api_id(api_id)
            .stage_name(stage)
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "CreateDeployment",
                    &format!("REST API {}", api_id),
                    e,
                    &[],
                    NOT_FOUND,
                )
            })?;
        Ok(())
    }

    async fn create_api_key(&self, name: &str, description: &str) -> Result<ApiKey> {
        let output = self
            .client
            .create_api_key()
            .name(name)
            .description(description)
            .enabled(true)
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "CreateApiKey",
                    &format!("API key {}", name),
                    e,
                    ALREADY_EXISTS,
                    &[],
                )
            })?;

        let id = output
            .id()
            .map(str::to_string)
            .ok_or_else(|| missing("CreateApiKey", "a key id"))?;
        Ok(ApiKey {
            id,
            value: output.value().map(str::to_string),
        })
    }

    async fn create_usage_plan(&self, plan: &UsagePlanSpec, api_id: &str) -> Result<String> {
        let output = self
            .client
            .create_usage_plan()
            .name(&plan.name)
            .description(&plan.description)
            .api_stages(ApiStage::builder().api_id(api_id).stage(&plan.stage).build())
            .throttle(
                ThrottleSettings::builder()
                    .rate_limit(plan.rate_limit)
                    .burst_limit(plan.burst_limit)
                    .build(),
            )
            .quota(
                QuotaSettings::builder()
                    .limit(plan.quota_limit)
                    .period(QuotaPeriodType::from(plan.quota_period.as_str()))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "CreateUsagePlan",
                    &format!("Usage plan {}", plan.name),
                    e,
                    ALREADY_EXISTS,
                    NOT_FOUND,
                )
            })?;

        output
            .id()
            .map(str::to_string)
            .ok_or_else(|| missing("CreateUsagePlan", "a usage plan id"))
    }

    async fn create_usage_plan_key(&self, usage_plan_id: &str, key_id: &str) -> Result<()> {
        self.client
            .create_usage_plan_key()
            .usage_plan_id(usage_plan_id)
            .key_id(key_id)
            .key_type("API_KEY")
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "CreateUsagePlanKey",
                    &format!("Usage plan {}", usage_plan_id),
                    e,
                    ALREADY_EXISTS,
                    NOT_FOUND,
                )
            })?;
        Ok(())
    }

    async fn delete_rest_api(&self, api_id: &str) -> Result<()> {
        self.client
            .delete_rest_api()
            .rest_api_id(api_id)
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "DeleteRestApi",
                    &format!("REST API {}", api_id),
                    e,
                    &[],
                    NOT_FOUND,
                )
            })?;
        Ok(())
    }

    async fn find_usage_plans(&self, name: &str) -> Result<Vec<UsagePlanRef>> {
        let mut plans = Vec::new();
        let mut position: Option<String> = None;

        loop {
            let output = self
                .client
                .get_usage_plans()
                .limit(PAGE_SIZE)
                .set_position(position.take())
                .send()
                .await
                .map_err(|e| classify(SERVICE, "GetUsagePlans", "usage plans", e, &[], &[]))?;

            for plan in output.items().iter().filter(|plan| plan.name() == Some(name)) {
                let Some(id) = plan.id() else {
                    continue;
                };
                let stages = plan
                    .api_stages()
                    .iter()
                    .filter_map(|stage| Some((stage.api_id()?.to_string(), stage.stage()?.to_string())))
                    .collect();
                plans.push(UsagePlanRef {
                    id: id.to_string(),
                    stages,
                });
            }

            match output.position() {
                Some(next) => position = Some(next.to_string()),
                None => return Ok(plans),
            }
        }
    }

    async fn remove_usage_plan_stage(
        &self,
        usage_plan_id: &str,
        api_id: &str,
        stage: &str,
    ) -> Result<()> {
        self.client
            .update_usage_plan()
            .usage_plan_id(usage_plan_id)
            .patch_operations(
                PatchOperation::builder()
                    .op(Op::Remove)
                    .path("/apiStages")
                    .value(format!("{}:{}", api_id, stage))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "UpdateUsagePlan",
                    &format!("Usage plan {}", usage_plan_id),
                    e,
                    &[],
                    NOT_FOUND,
                )
            })?;
        Ok(())
    }

    async fn delete_usage_plan(&self, usage_plan_id: &str) -> Result<()> {
        self.client
            .delete_usage_plan()
            .usage_plan_id(usage_plan_id)
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "DeleteUsagePlan",
                    &format!("Usage plan {}", usage_plan_id),
                    e,
                    &[],
                    NOT_FOUND,
                )
            })?;
        Ok(())
    }

    async fn find_api_keys(&self, name: &str) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut position: Option<String> = None;

        loop {
            let output = self
                .client
                .get_api_keys()
                .name_query(name)
                .limit(PAGE_SIZE)
                .set_position(position.take())
                .send()
                .await
                .map_err(|e| classify(SERVICE, "GetApiKeys", "API keys", e, &[], &[]))?;

            // `name_query` is a prefix match.
            ids.extend(
                output
                    .items()
                    .iter()
                    .filter(|key| key.name() == Some(name))
                    .filter_map(|key| key.id().map(str::to_string)),
            );

            match output.position() {
                Some(next) => position = Some(next.to_string()),
                None => return Ok(ids),
            }
        }
    }

    async fn delete_api_key(&self, key_id: &str) -> Result<()> {
        self.client
            .delete_api_key()
            .api_key(key_id)
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "DeleteApiKey",
                    &format!("API key {}", key_id),
                    e,
                    &[],
                    NOT_FOUND,
                )
            })?;
        Ok(())
    }
}
