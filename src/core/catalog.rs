use crate::config::AssetConfig;
use crate::domain::model::{Item, ObjectUpload};
use crate::utils::error::{LabError, Result};
use std::path::Path;

fn read_with_context(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        LabError::IoError(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })
}

/// Reads the seed catalog: a JSON array of items in DynamoDB wire format.
/// Every item must carry the table's partition key as a string.
pub fn load_catalog(path: &Path, partition_key: &str) -> Result<Vec<Item>> {
    let bytes = read_with_context(path)?;
    let items: Vec<Item> = serde_json::from_slice(&bytes)?;

    for (index, item) in items.iter().enumerate() {
        if item.get(partition_key).and_then(|v| v.as_s()).is_none() {
            return Err(LabError::ConfigValidationError {
                field: format!("{}[{}]", path.display(), index),
                message: format!("item has no string '{}' attribute", partition_key),
            });
        }
    }

    tracing::debug!("Loaded {} catalog items from {}", items.len(), path.display());
    Ok(items)
}

/// Human-readable name of a catalog item for narration.
pub fn item_label(item: &Item, partition_key: &str) -> String {
    item.get("nom")
        .or_else(|| item.get("name"))
        .or_else(|| item.get(partition_key))
        .map(|value| value.to_string())
        .unwrap_or_else(|| "<unnamed>".to_string())
}

pub fn read_asset(assets_dir: &Path, asset: &AssetConfig) -> Result<ObjectUpload> {
    let body = read_with_context(&assets_dir.join(&asset.file))?;
    Ok(ObjectUpload {
        key: asset.key.clone(),
        body,
        content_type: asset.content_type.clone(),
    })
}
