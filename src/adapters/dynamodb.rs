use crate::adapters::classify;
use crate::domain::model::{AttributeValue, Item, TableSpec, TableState};
use crate::domain::ports::KeyValueStore;
use crate::utils::error::{LabError, Result};
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue as SdkAttributeValue, BillingMode, KeySchemaElement,
    KeyType, ScalarAttributeType, TableStatus,
};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use std::collections::HashMap;
use std::time::{Duration, Instant};

const SERVICE: &str = "dynamodb";
const POLL_INTERVAL: Duration = Duration::from_secs(2);
const RESOURCE_NOT_FOUND: &[&str] = &["ResourceNotFoundException"];

#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: DynamoDbClient,
}

impl DynamoDbStore {
    pub fn new(client: DynamoDbClient) -> Self {
        Self { client }
    }
}

pub(crate) fn to_sdk(value: AttributeValue) -> SdkAttributeValue {
    match value {
        AttributeValue::S(v) => SdkAttributeValue::S(v),
        AttributeValue::N(v) => SdkAttributeValue::N(v),
        AttributeValue::Bool(v) => SdkAttributeValue::Bool(v),
        AttributeValue::Null(v) => SdkAttributeValue::Null(v),
        AttributeValue::L(v) => SdkAttributeValue::L(v.into_iter().map(to_sdk).collect()),
        AttributeValue::M(v) => {
            SdkAttributeValue::M(v.into_iter().map(|(k, v)| (k, to_sdk(v))).collect())
        }
        AttributeValue::Ss(v) => SdkAttributeValue::Ss(v),
        AttributeValue::Ns(v) => SdkAttributeValue::Ns(v),
    }
}

/// Binary attributes have no counterpart in the catalog model and are dropped.
pub(crate) fn from_sdk(value: &SdkAttributeValue) -> Option<AttributeValue> {
    let converted = match value {
        SdkAttributeValue::S(v) => AttributeValue::S(v.clone()),
        SdkAttributeValue::N(v) => AttributeValue::N(v.clone()),
        SdkAttributeValue::Bool(v) => AttributeValue::Bool(*v),
        SdkAttributeValue::Null(v) => AttributeValue::Null(*v),
        SdkAttributeValue::L(v) => AttributeValue::L(v.iter().filter_map(from_sdk).collect()),
        SdkAttributeValue::M(v) => AttributeValue::M(
            v.iter()
                .filter_map(|(k, v)| from_sdk(v).map(|v| (k.clone(), v)))
                .collect(),
        ),
        SdkAttributeValue::Ss(v) => AttributeValue::Ss(v.clone()),
        SdkAttributeValue::Ns(v) => AttributeValue::Ns(v.clone()),
        _ => return None,
    };
    Some(converted)
}

fn to_sdk_item(item: Item) -> HashMap<String, SdkAttributeValue> {
    item.into_iter().map(|(k, v)| (k, to_sdk(v))).collect()
}

fn from_sdk_item(item: &HashMap<String, SdkAttributeValue>) -> Item {
    item.iter()
        .filter_map(|(k, v)| from_sdk(v).map(|v| (k.clone(), v)))
        .collect()
}

fn build_error(err: aws_sdk_dynamodb::error::BuildError) -> LabError {
    LabError::provisioning(format!("Invalid DynamoDB request: {}", err))
}

#[async_trait]
impl KeyValueStore for DynamoDbStore {
    async fn create_table(&self, table: &TableSpec) -> Result<()> {
        let key_schema = KeySchemaElement::builder()
            .attribute_name(&table.partition_key)
            .key_type(KeyType::Hash)
            .build()
            .map_err(build_error)?;
        let attribute = AttributeDefinition::builder()
            .attribute_name(&table.partition_key)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(build_error)?;

        self.client
            .create_table()
            .table_name(&table.name)
            .key_schema(key_schema)
            .attribute_definitions(attribute)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "CreateTable",
                    &format!("Table {}", table.name),
                    e,
                    &["ResourceInUseException"],
                    &[],
                )
            })?;
        Ok(())
    }

    async fn wait_for_table(
        &self,
        table: &str,
        state: TableState,
        max_wait: Duration,
    ) -> Result<()> {
        let started = Instant::now();

        loop {
            let described = self
                .client
                .describe_table()
                .table_name(table)
                .send()
                .await
                .map_err(|e| {
                    classify(
                        SERVICE,
                        "DescribeTable",
                        &format!("Table {}", table),
                        e,
                        &[],
                        RESOURCE_NOT_FOUND,
                    )
                });

            match described {
                Ok(output) => {
                    let status = output.table().and_then(|t| t.table_status());
                    tracing::debug!("Table {} status: {:?}", table, status);
                    if state == TableState::Active && status == Some(&TableStatus::Active) {
                        return Ok(());
                    }
                }
                Err(err) if err.is_not_found() => {
                    if state == TableState::Deleted {
                        return Ok(());
                    }
                }
                Err(err) => return Err(err),
            }

            if started.elapsed() >= max_wait {
                return Err(LabError::Timeout {
                    what: format!("table {} to become {}", table, state),
                    seconds: max_wait.as_secs(),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn put_item(&self, table: &str, item: Item) -> Result<()> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(to_sdk_item(item)))
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "PutItem",
                    &format!("Table {}", table),
                    e,
                    &[],
                    RESOURCE_NOT_FOUND,
                )
            })?;
        Ok(())
    }

    async fn scan(&self, table: &str) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut exclusive_start_key: Option<HashMap<String, SdkAttributeValue>> = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(table)
                .set_exclusive_start_key(exclusive_start_key.take())
                .send()
                .await
                .map_err(|e| {
                    classify(
                        SERVICE,
                        "Scan",
                        &format!("Table {}", table),
                        e,
                        &[],
                        RESOURCE_NOT_FOUND,
                    )
                })?;

            items.extend(output.items().iter().map(from_sdk_item));

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(items)
    }

    async fn delete_item(&self, table: &str, key: Item) -> Result<()> {
        self.client
            .delete_item()
            .table_name(table)
            .set_key(Some(to_sdk_item(key)))
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "DeleteItem",
                    &format!("Table {}", table),
                    e,
                    &[],
                    RESOURCE_NOT_FOUND,
                )
            })?;
        Ok(())
    }

    async fn delete_table(&self, table: &str) -> Result<()> {
        self.client
            .delete_table()
            .table_name(table)
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "DeleteTable",
                    &format!("Table {}", table),
                    e,
                    &[],
                    RESOURCE_NOT_FOUND,
                )
            })?;
        Ok(())
    }
}
