use async_trait::async_trait;
use cloud_labs::core::{InMemoryServices, KeyValueStore, ObjectStore};
use cloud_labs::domain::model::{IntegrationKind, Item, TableSpec, TableState};
use cloud_labs::{InMemoryCloud, LabError, ProjectConfig, ProjectDeployer, Result, Services};
use std::time::Duration;
use tempfile::TempDir;

const SHIPS: &str = r#"[
  {"id": {"S": "b-001"}, "nom": {"S": "Le Pecheur"}, "type": {"S": "pecheur"},
   "pavillon": {"S": "France"}, "taille": {"N": "18"}, "nombre_marins": {"N": "6"},
   "s3_image_key": {"S": "pecheur-b-001.jpg"}},
  {"id": {"S": "b-002"}, "nom": {"S": "Atlantic Carrier"}, "type": {"S": "tanker"},
   "pavillon": {"S": "Liberia"}, "taille": {"N": "245"}, "nombre_marins": {"N": "28"},
   "s3_image_key": {"S": "tanker-b-002.jpg"}}
]"#;

/// Default lab config rooted in a temp dir holding the two images and the catalog.
fn lab_fixture() -> (TempDir, ProjectConfig) {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("assets")).unwrap();
    std::fs::create_dir_all(dir.path().join("data")).unwrap();
    std::fs::write(dir.path().join("assets/fisher.jpg"), b"fisher-bytes").unwrap();
    std::fs::write(dir.path().join("assets/tanker.jpg"), b"tanker-bytes").unwrap();
    std::fs::write(dir.path().join("data/ships.json"), SHIPS).unwrap();

    let config = ProjectConfig {
        base_dir: Some(dir.path().to_path_buf()),
        ..ProjectConfig::default()
    };
    (dir, config)
}

fn cloud_with_roles() -> InMemoryCloud {
    InMemoryCloud::new()
        .with_role(
            "APIGatewayDynamoDBServiceRole",
            "arn:aws:iam::123456789012:role/APIGatewayDynamoDBServiceRole",
        )
        .with_role(
            "APIGatewayS3ServiceRole",
            "arn:aws:iam::123456789012:role/APIGatewayS3ServiceRole",
        )
}

/// `service:Operation` of every journal entry, details stripped.
fn operations(cloud: &InMemoryCloud) -> Vec<String> {
    cloud
        .journal()
        .iter()
        .map(|entry| entry.split(' ').next().unwrap_or_default().to_string())
        .collect()
}

fn count(cloud: &InMemoryCloud, operation: &str) -> usize {
    operations(cloud).iter().filter(|op| *op == operation).count()
}

#[tokio::test]
async fn test_deploy_issues_calls_in_order() {
    let (_dir, config) = lab_fixture();
    let cloud = cloud_with_roles();

    let report = ProjectDeployer::new(InMemoryServices::from(&cloud), config)
        .run()
        .await
        .unwrap();

    let mut expected = vec![
        "s3:CreateBucket",
        "s3:PutObject",
        "s3:PutObject",
        "dynamodb:CreateTable",
        "dynamodb:DescribeTable",
        "dynamodb:PutItem",
        "dynamodb:PutItem",
        "apigateway:GetRestApis",
        "apigateway:CreateRestApi",
        "apigateway:GetResources",
        "iam:GetRole",
        "iam:GetRole",
    ];
    expected.extend(["apigateway:CreateResource"; 5]);
    for _ in 0..6 {
        expected.extend([
            "apigateway:PutMethod",
            "apigateway:PutIntegration",
            "apigateway:PutMethodResponse",
            "apigateway:PutIntegrationResponse",
        ]);
    }
    expected.extend([
        "apigateway:CreateDeployment",
        "apigateway:CreateApiKey",
        "apigateway:CreateUsagePlan",
        "apigateway:CreateUsagePlanKey",
    ]);
    assert_eq!(operations(&cloud), expected);

    let journal = cloud.journal();
    assert_eq!(journal[0], "s3:CreateBucket ships-capstone-project-bucket (eu-west-1)");
    assert_eq!(journal[3], "dynamodb:CreateTable ShipsTable (hash key id)");
    assert_eq!(journal[10], "iam:GetRole APIGatewayDynamoDBServiceRole");
    assert_eq!(journal[11], "iam:GetRole APIGatewayS3ServiceRole");

    assert_eq!(report.objects_uploaded, 2);
    assert_eq!(report.items_inserted, 2);
    assert_eq!(
        report.api_url,
        format!(
            "https://{}.execute-api.eu-west-1.amazonaws.com/dev",
            report.api_id
        )
    );
    assert_eq!(
        report.api_key_value,
        Some(format!("{}-value", report.api_key_id))
    );
}

#[tokio::test]
async fn test_deploy_seeds_bucket_and_table() {
    let (_dir, config) = lab_fixture();
    let cloud = cloud_with_roles();

    ProjectDeployer::new(InMemoryServices::from(&cloud), config)
        .run()
        .await
        .unwrap();

    let keys = cloud.bucket_keys("ships-capstone-project-bucket").unwrap();
    assert_eq!(keys, vec!["pecheur-b-001.jpg", "tanker-b-002.jpg"]);

    let fisher = cloud
        .object("ships-capstone-project-bucket", "pecheur-b-001.jpg")
        .unwrap();
    assert_eq!(fisher.body, b"fisher-bytes");
    assert_eq!(fisher.content_type, "image/jpeg");

    let items = cloud.table_items("ShipsTable").unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["nom"].as_s(), Some("Le Pecheur"));
    assert_eq!(items[1]["taille"].as_n(), Some("245"));
}

#[tokio::test]
async fn test_deploy_builds_the_ships_api() {
    let (_dir, config) = lab_fixture();
    let cloud = cloud_with_roles();

    let report = ProjectDeployer::new(InMemoryServices::from(&cloud), config)
        .run()
        .await
        .unwrap();
    let api_id = &report.api_id;

    let mut paths = cloud.resource_paths(api_id);
    paths.sort();
    assert_eq!(
        paths,
        vec![
            "/",
            "/ships",
            "/ships/photo",
            "/ships/photo/{key}",
            "/ships/profile",
            "/ships/profile/{key}",
        ]
    );

    let list = cloud.method(api_id, "/ships", "GET").unwrap();
    assert!(list.method.unwrap().api_key_required);
    let integration = list.integration.unwrap();
    assert_eq!(integration.kind, IntegrationKind::Aws);
    assert_eq!(
        integration.uri.as_deref(),
        Some("arn:aws:apigateway:eu-west-1:dynamodb:action/Scan")
    );
    assert_eq!(
        integration.credentials.as_deref(),
        Some("arn:aws:iam::123456789012:role/APIGatewayDynamoDBServiceRole")
    );

    let photo = cloud.method(api_id, "/ships/photo/{key}", "GET").unwrap();
    let integration = photo.integration.unwrap();
    assert_eq!(
        integration.credentials.as_deref(),
        Some("arn:aws:iam::123456789012:role/APIGatewayS3ServiceRole")
    );
    assert_eq!(photo.method_responses[0].status_code, "200");
    assert_eq!(photo.integration_responses.len(), 1);

    for path in ["/ships", "/ships/profile/{key}", "/ships/photo/{key}"] {
        let preflight = cloud.method(api_id, path, "OPTIONS").unwrap();
        assert!(!preflight.method.unwrap().api_key_required);
        assert_eq!(preflight.integration.unwrap().kind, IntegrationKind::Mock);
    }

    assert_eq!(cloud.stages(api_id), vec!["dev"]);
    let (stages, keys) = cloud.usage_plan("ShipsAPI-UsagePlan").unwrap();
    assert_eq!(stages, vec![(api_id.clone(), "dev".to_string())]);
    assert_eq!(keys, vec![report.api_key_id.clone()]);
    assert_eq!(cloud.api_key_names(), vec!["ShipsAPI-key"]);
}

#[tokio::test]
async fn test_existing_bucket_and_table_are_tolerated() {
    let (_dir, config) = lab_fixture();
    let cloud = cloud_with_roles();
    cloud
        .create_bucket("ships-capstone-project-bucket", "eu-west-1")
        .await
        .unwrap();
    cloud
        .create_table(&TableSpec {
            name: "ShipsTable".to_string(),
            partition_key: "id".to_string(),
        })
        .await
        .unwrap();

    let report = ProjectDeployer::new(InMemoryServices::from(&cloud), config)
        .run()
        .await
        .unwrap();

    assert_eq!(report.items_inserted, 2);
    // Only the table created here is waited on.
    assert_eq!(count(&cloud, "dynamodb:DescribeTable"), 0);
    assert_eq!(cloud.rest_api_names(), vec!["ShipsAPI"]);
}

#[tokio::test]
async fn test_second_deploy_creates_another_api() {
    let (_dir, config) = lab_fixture();
    let cloud = cloud_with_roles();

    let first = ProjectDeployer::new(InMemoryServices::from(&cloud), config.clone())
        .run()
        .await
        .unwrap();
    let second = ProjectDeployer::new(InMemoryServices::from(&cloud), config)
        .run()
        .await
        .unwrap();

    assert_ne!(first.api_id, second.api_id);
    assert_eq!(cloud.rest_api_names(), vec!["ShipsAPI", "ShipsAPI"]);
    assert_eq!(cloud.table_items("ShipsTable").unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_role_removes_the_new_api() {
    let (_dir, config) = lab_fixture();
    let cloud = InMemoryCloud::new();

    let err = ProjectDeployer::new(InMemoryServices::from(&cloud), config)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, LabError::ProvisioningError { .. }));
    assert!(err
        .to_string()
        .contains("Failed to get role ARN for APIGatewayDynamoDBServiceRole"));

    assert_eq!(count(&cloud, "apigateway:DeleteRestApi"), 1);
    assert_eq!(count(&cloud, "apigateway:CreateResource"), 0);
    assert!(cloud.rest_api_names().is_empty());

    // Storage created before the API stays in place.
    assert!(cloud.bucket_keys("ships-capstone-project-bucket").is_some());
    assert!(cloud.table_items("ShipsTable").is_some());
}

#[tokio::test]
async fn test_failed_deployment_stops_before_api_key() {
    let (_dir, config) = lab_fixture();
    let cloud = cloud_with_roles().fail_on("CreateDeployment", "stage limit reached");

    let err = ProjectDeployer::new(InMemoryServices::from(&cloud), config)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LabError::Cloud {
            operation: "CreateDeployment",
            ..
        }
    ));
    assert_eq!(count(&cloud, "apigateway:CreateApiKey"), 0);
    assert_eq!(count(&cloud, "apigateway:DeleteRestApi"), 1);
    assert_eq!(
        operations(&cloud).last().map(String::as_str),
        Some("apigateway:DeleteRestApi")
    );
    assert!(cloud.rest_api_names().is_empty());
}

#[tokio::test]
async fn test_failed_cleanup_keeps_original_error() {
    let (_dir, config) = lab_fixture();
    let cloud = cloud_with_roles()
        .fail_on("CreateUsagePlan", "throttled")
        .fail_on("DeleteRestApi", "access denied");

    let err = ProjectDeployer::new(InMemoryServices::from(&cloud), config)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LabError::Cloud {
            operation: "CreateUsagePlan",
            ..
        }
    ));
    assert_eq!(count(&cloud, "apigateway:DeleteRestApi"), 1);
    assert_eq!(cloud.rest_api_names(), vec!["ShipsAPI"]);
}

#[tokio::test]
async fn test_missing_asset_stops_after_bucket() {
    let dir = TempDir::new().unwrap();
    let config = ProjectConfig {
        base_dir: Some(dir.path().to_path_buf()),
        ..ProjectConfig::default()
    };
    let cloud = cloud_with_roles();

    let err = ProjectDeployer::new(InMemoryServices::from(&cloud), config)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, LabError::IoError(_)));
    assert!(err.to_string().contains("fisher.jpg"));
    assert_eq!(operations(&cloud), vec!["s3:CreateBucket"]);
}

/// Table that reports as existing while it is still being deleted, so writes to it fail.
struct TableBeingDeleted {
    inner: InMemoryCloud,
}

#[async_trait]
impl KeyValueStore for TableBeingDeleted {
    async fn create_table(&self, table: &TableSpec) -> Result<()> {
        Err(LabError::already_exists(format!("table {}", table.name)))
    }

    async fn wait_for_table(&self, table: &str, state: TableState, max_wait: Duration) -> Result<()> {
        self.inner.wait_for_table(table, state, max_wait).await
    }

    async fn put_item(&self, table: &str, item: Item) -> Result<()> {
        self.inner.put_item(table, item).await
    }

    async fn scan(&self, table: &str) -> Result<Vec<Item>> {
        self.inner.scan(table).await
    }

    async fn delete_item(&self, table: &str, key: Item) -> Result<()> {
        self.inner.delete_item(table, key).await
    }

    async fn delete_table(&self, table: &str) -> Result<()> {
        self.inner.delete_table(table).await
    }
}

#[tokio::test]
async fn test_missing_table_on_insert_fails_the_run() {
    let (_dir, config) = lab_fixture();
    let cloud = cloud_with_roles();
    let services = Services {
        objects: cloud.clone(),
        tables: TableBeingDeleted {
            inner: cloud.clone(),
        },
        api: cloud.clone(),
        identity: cloud.clone(),
    };

    let err = ProjectDeployer::new(services, config).run().await.unwrap_err();

    assert!(err.is_not_found());
    assert_ne!(err.exit_code(), 0);
    assert_eq!(count(&cloud, "dynamodb:PutItem"), 1);
    assert_eq!(count(&cloud, "apigateway:CreateRestApi"), 0);
}
