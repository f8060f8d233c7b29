use crate::adapters::classify;
use crate::domain::ports::IdentityService;
use crate::utils::error::{LabError, Result};
use async_trait::async_trait;
use aws_sdk_iam::Client as IamClient;

#[derive(Debug, Clone)]
pub struct IamIdentity {
    client: IamClient,
}

impl IamIdentity {
    pub fn new(client: IamClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityService for IamIdentity {
    async fn role_arn(&self, role_name: &str) -> Result<String> {
        let output = self
            .client
            .get_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(|e| {
                classify(
                    "iam",
                    "GetRole",
                    &format!("IAM role {}", role_name),
                    e,
                    &[],
                    &["NoSuchEntity"],
                )
            })?;

        output
            .role()
            .map(|role| role.arn().to_string())
            .ok_or_else(|| LabError::not_found(format!("IAM role {}", role_name)))
    }
}
