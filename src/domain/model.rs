use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A DynamoDB attribute in its wire JSON form, e.g. `{"S": "pecheur"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    N(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    L(Vec<AttributeValue>),
    M(BTreeMap<String, AttributeValue>),
    #[serde(rename = "SS")]
    Ss(Vec<String>),
    #[serde(rename = "NS")]
    Ns(Vec<String>),
}

impl AttributeValue {
    pub fn as_s(&self) -> Option<&str> {
        match self {
            Self::S(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_n(&self) -> Option<&str> {
        match self {
            Self::N(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S(value) | Self::N(value) => f.write_str(value),
            Self::Bool(value) => write!(f, "{}", value),
            Self::Null(_) => f.write_str("null"),
            other => match serde_json::to_string(other) {
                Ok(json) => f.write_str(&json),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}

pub type Item = BTreeMap<String, AttributeValue>;

/// Table keyed on a single string partition key, billed on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: String,
    pub partition_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    Active,
    Deleted,
}

impl fmt::Display for TableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Deleted => f.write_str("deleted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectUpload {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestApiSpec {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    pub http_method: String,
    pub api_key_required: bool,
    /// `method.request.*` parameter name to "required" flag.
    pub request_parameters: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationKind {
    Aws,
    Mock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationSpec {
    pub kind: IntegrationKind,
    pub integration_http_method: Option<String>,
    pub uri: Option<String>,
    pub credentials: Option<String>,
    pub request_parameters: BTreeMap<String, String>,
    pub request_templates: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodResponseSpec {
    pub status_code: String,
    pub response_parameters: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationResponseSpec {
    pub status_code: String,
    pub response_parameters: BTreeMap<String, String>,
    pub response_templates: BTreeMap<String, String>,
}

/// Everything needed to wire one HTTP method on one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSpec {
    pub resource_path: String,
    pub method: MethodSpec,
    pub integration: IntegrationSpec,
    pub method_response: MethodResponseSpec,
    pub integration_response: IntegrationResponseSpec,
}

impl EndpointSpec {
    pub fn label(&self) -> String {
        format!("{} {}", self.method.http_method, self.resource_path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsagePlanSpec {
    pub name: String,
    pub description: String,
    pub stage: String,
    pub rate_limit: f64,
    pub burst_limit: i32,
    pub quota_limit: i32,
    pub quota_period: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub id: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsagePlanRef {
    pub id: String,
    /// `(api_id, stage)` pairs the plan is attached to.
    pub stages: Vec<(String, String)>,
}
