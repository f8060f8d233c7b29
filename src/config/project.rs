use crate::domain::model::{RestApiSpec, TableSpec, UsagePlanSpec};
use crate::utils::error::{LabError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything the deploy and destroy runs need to know. Every field has a
/// default, so an empty file (or no file at all) describes the ships lab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    pub project: ProjectSection,
    pub bucket: BucketConfig,
    pub table: TableConfig,
    pub api: ApiConfig,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSection {
    pub name: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketConfig {
    pub name: String,
    pub assets_dir: String,
    pub objects: Vec<AssetConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetConfig {
    pub file: String,
    pub key: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub name: String,
    pub partition_key: String,
    pub seed_file: String,
    pub wait_timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub name: String,
    pub description: String,
    pub stage: String,
    pub dynamodb_role: String,
    pub s3_role: String,
    pub usage_plan: UsagePlanConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsagePlanConfig {
    pub name: String,
    pub description: String,
    pub rate_limit: f64,
    pub burst_limit: i32,
    pub quota_limit: i32,
    pub quota_period: String,
}

fn default_content_type() -> String {
    "image/jpeg".to_string()
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            name: "ships-capstone".to_string(),
            region: "eu-west-1".to_string(),
        }
    }
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            name: "ships-capstone-project-bucket".to_string(),
            assets_dir: "assets".to_string(),
            objects: vec![
                AssetConfig {
                    file: "fisher.jpg".to_string(),
                    key: "pecheur-b-001.jpg".to_string(),
                    content_type: default_content_type(),
                },
                AssetConfig {
                    file: "tanker.jpg".to_string(),
                    key: "tanker-b-002.jpg".to_string(),
                    content_type: default_content_type(),
                },
            ],
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "ShipsTable".to_string(),
            partition_key: "id".to_string(),
            seed_file: "data/ships.json".to_string(),
            wait_timeout_seconds: 60,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            name: "ShipsAPI".to_string(),
            description: "Ships API for Capstone Project".to_string(),
            stage: "dev".to_string(),
            dynamodb_role: "APIGatewayDynamoDBServiceRole".to_string(),
            s3_role: "APIGatewayS3ServiceRole".to_string(),
            usage_plan: UsagePlanConfig::default(),
        }
    }
}

impl Default for UsagePlanConfig {
    fn default() -> Self {
        Self {
            name: "ShipsAPI-UsagePlan".to_string(),
            description: "Usage plan for Ships API".to_string(),
            rate_limit: 100.0,
            burst_limit: 200,
            quota_limit: 10_000,
            quota_period: "MONTH".to_string(),
        }
    }
}

impl ProjectConfig {
    /// Loads a TOML file; relative paths inside it resolve against its directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| LabError::ConfigError {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LabError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables are left as is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LabError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        if let Some(region) = region {
            self.project.region = region;
        }
        self
    }

    pub fn region(&self) -> &str {
        &self.project.region
    }

    pub fn resolve_path(&self, relative: &str) -> PathBuf {
        match &self.base_dir {
            Some(base) => base.join(relative),
            None => PathBuf::from(relative),
        }
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.resolve_path(&self.bucket.assets_dir)
    }

    pub fn seed_file(&self) -> PathBuf {
        self.resolve_path(&self.table.seed_file)
    }

    pub fn table_wait(&self) -> Duration {
        Duration::from_secs(self.table.wait_timeout_seconds)
    }

    pub fn table_spec(&self) -> TableSpec {
        TableSpec {
            name: self.table.name.clone(),
            partition_key: self.table.partition_key.clone(),
        }
    }

    pub fn rest_api_spec(&self) -> RestApiSpec {
        RestApiSpec {
            name: self.api.name.clone(),
            description: self.api.description.clone(),
        }
    }

    pub fn api_key_name(&self) -> String {
        format!("{}-key", self.api.name)
    }

    pub fn usage_plan_spec(&self) -> UsagePlanSpec {
        let plan = &self.api.usage_plan;
        UsagePlanSpec {
            name: plan.name.clone(),
            description: plan.description.clone(),
            stage: self.api.stage.clone(),
            rate_limit: plan.rate_limit,
            burst_limit: plan.burst_limit,
            quota_limit: plan.quota_limit,
            quota_period: plan.quota_period.clone(),
        }
    }

    pub fn invoke_url(&self, api_id: &str) -> String {
        format!(
            "https://{}.execute-api.{}.amazonaws.com/{}",
            api_id, self.project.region, self.api.stage
        )
    }
}

impl Validate for ProjectConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_aws_region("project.region", &self.project.region)?;
        validation::validate_s3_bucket_name("bucket.name", &self.bucket.name)?;
        validation::validate_path("bucket.assets_dir", &self.bucket.assets_dir)?;
        for (index, asset) in self.bucket.objects.iter().enumerate() {
            validation::validate_path(&format!("bucket.objects[{}].file", index), &asset.file)?;
            validation::validate_non_empty_string(
                &format!("bucket.objects[{}].key", index),
                &asset.key,
            )?;
        }

        validation::validate_table_name("table.name", &self.table.name)?;
        validation::validate_non_empty_string("table.partition_key", &self.table.partition_key)?;
        validation::validate_path("table.seed_file", &self.table.seed_file)?;
        validation::validate_range(
            "table.wait_timeout_seconds",
            self.table.wait_timeout_seconds,
            1,
            3600,
        )?;

        validation::validate_non_empty_string("api.name", &self.api.name)?;
        validation::validate_non_empty_string("api.stage", &self.api.stage)?;
        validation::validate_non_empty_string("api.dynamodb_role", &self.api.dynamodb_role)?;
        validation::validate_non_empty_string("api.s3_role", &self.api.s3_role)?;

        let plan = &self.api.usage_plan;
        validation::validate_non_empty_string("api.usage_plan.name", &plan.name)?;
        validation::validate_range("api.usage_plan.rate_limit", plan.rate_limit, 0.001, 10_000.0)?;
        validation::validate_range("api.usage_plan.burst_limit", plan.burst_limit, 1, 5_000)?;
        validation::validate_range("api.usage_plan.quota_limit", plan.quota_limit, 1, i32::MAX)?;
        validation::validate_one_of(
            "api.usage_plan.quota_period",
            &plan.quota_period,
            &["DAY", "WEEK", "MONTH"],
        )?;

        tracing::debug!("✅ Project configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_describe_the_ships_lab() {
        let config = ProjectConfig::from_toml_str("").unwrap();

        assert_eq!(config.region(), "eu-west-1");
        assert_eq!(config.bucket.name, "ships-capstone-project-bucket");
        assert_eq!(config.bucket.objects[1].key, "tanker-b-002.jpg");
        assert_eq!(config.table.name, "ShipsTable");
        assert_eq!(config.api_key_name(), "ShipsAPI-key");
        assert_eq!(config.usage_plan_spec().quota_period, "MONTH");
        assert_eq!(
            config.invoke_url("abc123"),
            "https://abc123.execute-api.eu-west-1.amazonaws.com/dev"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = ProjectConfig::from_toml_str(
            r#"
[project]
region = "us-east-1"

[api]
stage = "prod"

[[bucket.objects]]
file = "liner.png"
key = "liner-c-003.png"
content_type = "image/png"
"#,
        )
        .unwrap();

        assert_eq!(config.region(), "us-east-1");
        assert_eq!(config.api.name, "ShipsAPI");
        assert_eq!(config.api.stage, "prod");
        assert_eq!(config.bucket.name, "ships-capstone-project-bucket");
        assert_eq!(config.bucket.objects.len(), 1);
        assert_eq!(config.bucket.objects[0].content_type, "image/png");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CLOUD_LABS_TEST_BUCKET", "ships-from-env");

        let config = ProjectConfig::from_toml_str(
            r#"
[bucket]
name = "${CLOUD_LABS_TEST_BUCKET}"
"#,
        )
        .unwrap();
        assert_eq!(config.bucket.name, "ships-from-env");

        std::env::remove_var("CLOUD_LABS_TEST_BUCKET");
    }

    #[test]
    fn test_config_validation() {
        let config = ProjectConfig::from_toml_str(
            r#"
[api.usage_plan]
quota_period = "YEAR"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = ProjectConfig::from_toml_str(
            r#"
[bucket]
name = "Ships_Bucket"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file_resolves_relative_paths() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[table]\nseed_file = \"seed/ships.json\"\n")
            .unwrap();

        let config = ProjectConfig::from_file(temp_file.path()).unwrap();
        let expected = temp_file.path().parent().unwrap().join("seed/ships.json");
        assert_eq!(config.seed_file(), expected);
    }

    #[test]
    fn test_region_override() {
        let config = ProjectConfig::default().with_region(Some("eu-central-1".to_string()));
        assert_eq!(config.region(), "eu-central-1");
        assert!(config.invoke_url("x").contains("eu-central-1"));
    }
}
