use crate::utils::error::{LabError, Result};
use crate::utils::validation::validate_url;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

/// One ship as rendered by the list and profile mapping templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipSummary {
    pub id: String,
    pub nom: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub pavillon: String,
    pub taille: f64,
    pub nombre_marins: u64,
    pub s3_image_key: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ShipList {
    ships: Vec<ShipSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub ships: Vec<ShipSummary>,
    pub profile_checked: Option<String>,
    pub photo_bytes: Option<usize>,
}

/// Smoke test for a deployed ships API.
pub struct ApiChecker {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl ApiChecker {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        validate_url("api_url", base_url)?;
        let base_url = Url::parse(base_url).map_err(|e| LabError::ConfigValidationError {
            field: "api_url".to_string(),
            message: e.to_string(),
        })?;
        if api_key.trim().is_empty() {
            return Err(LabError::MissingConfigError {
                field: "api_key".to_string(),
            });
        }
        Ok(Self {
            client: Client::new(),
            base_url,
            api_key: api_key.to_string(),
        })
    }

    /// Lists the ships, then fetches the first ship's profile and photo.
    pub async fn run(&self) -> Result<CheckReport> {
        tracing::info!("🔎 Checking {} ...", self.endpoint(&["ships"])?);
        let list: ShipList = self.get(&["ships"]).await?.json().await?;
        tracing::info!("✅ GET /ships returned {} ships", list.ships.len());

        let mut report = CheckReport {
            ships: list.ships,
            profile_checked: None,
            photo_bytes: None,
        };

        let Some(first) = report.ships.first().cloned() else {
            tracing::warn!("⚠️ WARNING: the catalog is empty; profile and photo not checked");
            return Ok(report);
        };

        let profile: ShipSummary = self
            .get(&["ships", "profile", first.id.as_str()])
            .await?
            .json()
            .await?;
        if profile.id != first.id {
            return Err(LabError::provisioning(format!(
                "Profile endpoint returned ship {} when asked for {}",
                profile.id, first.id
            )));
        }
        tracing::info!("✅ GET /ships/profile/{} returned {}", first.id, profile.nom);
        report.profile_checked = Some(profile.id);

        let photo = self
            .get(&["ships", "photo", first.s3_image_key.as_str()])
            .await?
            .bytes()
            .await?;
        tracing::info!(
            "✅ GET /ships/photo/{} returned {} bytes",
            first.s3_image_key,
            photo.len()
        );
        report.photo_bytes = Some(photo.len());

        Ok(report)
    }

    /// Appends `segments` to the stage URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LabError::ConfigValidationError {
                field: "api_url".to_string(),
                message: format!("{} cannot take path segments", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, segments: &[&str]) -> Result<reqwest::Response> {
        let url = self.endpoint(segments)?;
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?
            .error_for_status()?;
        Ok(response)
    }
}
