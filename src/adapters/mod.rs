// Adapters layer: concrete implementations of the domain ports.
// `aws` talks to the real control planes, `memory` is an in-process stand-in.

pub mod apigateway;
pub mod aws;
pub mod dynamodb;
pub mod iam;
pub mod memory;
pub mod s3;

pub use aws::AwsClients;
pub use memory::InMemoryCloud;

use crate::utils::error::LabError;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use std::collections::{BTreeMap, HashMap};

/// Maps an SDK failure onto the domain error, turning the service's
/// "already exists" / "not found" codes into their dedicated variants.
pub(crate) fn classify<E, R>(
    service: &'static str,
    operation: &'static str,
    resource: &str,
    err: SdkError<E, R>,
    already_exists: &[&str],
    not_found: &[&str],
) -> LabError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err
        .as_service_error()
        .and_then(|e| e.code())
        .map(str::to_string);

    match code.as_deref() {
        Some(c) if already_exists.contains(&c) => LabError::already_exists(resource),
        Some(c) if not_found.contains(&c) => LabError::not_found(resource),
        _ => {
            let message = DisplayErrorContext(&err).to_string();
            tracing::debug!("{} {} failed ({:?}): {}", service, operation, code, message);
            LabError::Cloud {
                service,
                operation,
                code,
                message,
            }
        }
    }
}

/// The SDK builders take `Option<HashMap>`; an empty map is sent as absent.
pub(crate) fn hash_map<V: Clone>(map: &BTreeMap<String, V>) -> Option<HashMap<String, V>> {
    if map.is_empty() {
        None
    } else {
        Some(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_map_skips_empty() {
        let empty: BTreeMap<String, bool> = BTreeMap::new();
        assert!(hash_map(&empty).is_none());

        let mut params = BTreeMap::new();
        params.insert("method.request.path.key".to_string(), true);
        let converted = hash_map(&params).unwrap();
        assert_eq!(converted.get("method.request.path.key"), Some(&true));
    }
}
