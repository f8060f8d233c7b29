//! Description of the ships REST API.
//!
//! The deploy run walks this description and issues one API Gateway call per
//! resource, method, integration and response, so the shape of the API lives
//! here rather than in the call sequence.

use crate::config::ProjectConfig;
use crate::domain::model::{
    EndpointSpec, IntegrationKind, IntegrationResponseSpec, IntegrationSpec, MethodResponseSpec,
    MethodSpec,
};
use serde_json::json;
use std::collections::BTreeMap;

const JSON: &str = "application/json";
const ALLOW_ORIGIN: &str = "method.response.header.Access-Control-Allow-Origin";
const ALLOW_HEADERS: &str = "method.response.header.Access-Control-Allow-Headers";
const ALLOW_METHODS: &str = "method.response.header.Access-Control-Allow-Methods";
const CONTENT_TYPE: &str = "method.response.header.Content-Type";
const PATH_KEY: &str = "method.request.path.key";
const INTEGRATION_PATH_KEY: &str = "integration.request.path.key";

pub const SHIPS_PATH: &str = "/ships";
pub const PROFILE_PATH: &str = "/ships/profile/{key}";
pub const PHOTO_PATH: &str = "/ships/photo/{key}";

/// Response templates read the ship id from `{partition_key}`, filled in by [`response_template`].
const SHIP_LIST_TEMPLATE: &str = r#"#set($inputRoot = $input.path('$'))
{
  "ships": [
    #foreach($item in $inputRoot.Items)
    {
      "id": "$item.{partition_key}.S",
      "nom": "$item.nom.S",
      "type": "$item.type.S",
      "pavillon": "$item.pavillon.S",
      "taille": $item.taille.N,
      "nombre_marins": $item.nombre_marins.N,
      "s3_image_key": "$item.s3_image_key.S"
    }#if($foreach.hasNext),#end
    #end
  ]
}"#;

const SHIP_PROFILE_TEMPLATE: &str = r#"#set($inputRoot = $input.path('$'))
{
  "id": "$inputRoot.Item.{partition_key}.S",
  "nom": "$inputRoot.Item.nom.S",
  "type": "$inputRoot.Item.type.S",
  "pavillon": "$inputRoot.Item.pavillon.S",
  "taille": $inputRoot.Item.taille.N,
  "nombre_marins": $inputRoot.Item.nombre_marins.N,
  "s3_image_key": "$inputRoot.Item.s3_image_key.S"
}"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleArns {
    pub dynamodb: String,
    pub s3: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBlueprint {
    /// Full resource paths, parents before children.
    pub resources: Vec<String>,
    pub endpoints: Vec<EndpointSpec>,
    pub cors: Vec<EndpointSpec>,
}

/// Splits `/a/b/c` into (`/a/b`, `c`); a top-level path has parent `/`.
pub fn split_resource_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(0) | None => ("/", path.trim_start_matches('/')),
        Some(index) => (&path[..index], &path[index + 1..]),
    }
}

fn map<V: Clone>(entries: &[(&str, V)]) -> BTreeMap<String, V> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn response_template(template: &str, config: &ProjectConfig) -> String {
    template.replace("{partition_key}", &config.table.partition_key)
}

fn get_method(path_param: bool) -> MethodSpec {
    MethodSpec {
        http_method: "GET".to_string(),
        api_key_required: true,
        request_parameters: if path_param {
            map(&[(PATH_KEY, true)])
        } else {
            BTreeMap::new()
        },
    }
}

fn ok_response(headers: &[(&str, bool)]) -> MethodResponseSpec {
    MethodResponseSpec {
        status_code: "200".to_string(),
        response_parameters: map(headers),
    }
}

fn list_ships(config: &ProjectConfig, role_arn: &str) -> EndpointSpec {
    EndpointSpec {
        resource_path: SHIPS_PATH.to_string(),
        method: get_method(false),
        integration: IntegrationSpec {
            kind: IntegrationKind::Aws,
            integration_http_method: Some("POST".to_string()),
            uri: Some(format!(
                "arn:aws:apigateway:{}:dynamodb:action/Scan",
                config.region()
            )),
            credentials: Some(role_arn.to_string()),
            request_parameters: BTreeMap::new(),
            request_templates: map(&[(JSON, json!({ "TableName": config.table.name }).to_string())]),
        },
        method_response: ok_response(&[(ALLOW_ORIGIN, false)]),
        integration_response: IntegrationResponseSpec {
            status_code: "200".to_string(),
            response_parameters: map(&[(ALLOW_ORIGIN, "'*'".to_string())]),
            response_templates: map(&[(JSON, response_template(SHIP_LIST_TEMPLATE, config))]),
        },
    }
}

fn ship_profile(config: &ProjectConfig, role_arn: &str) -> EndpointSpec {
    let request = json!({
        "TableName": config.table.name,
        "Key": {
            (config.table.partition_key.as_str()): { "S": "$input.params('key')" }
        }
    });
    let request_template =
        serde_json::to_string_pretty(&request).unwrap_or_else(|_| request.to_string());

    EndpointSpec {
        resource_path: PROFILE_PATH.to_string(),
        method: get_method(true),
        integration: IntegrationSpec {
            kind: IntegrationKind::Aws,
            integration_http_method: Some("POST".to_string()),
            uri: Some(format!(
                "arn:aws:apigateway:{}:dynamodb:action/GetItem",
                config.region()
            )),
            credentials: Some(role_arn.to_string()),
            request_parameters: map(&[(INTEGRATION_PATH_KEY, PATH_KEY.to_string())]),
            request_templates: map(&[(JSON, request_template)]),
        },
        method_response: ok_response(&[(ALLOW_ORIGIN, false)]),
        integration_response: IntegrationResponseSpec {
            status_code: "200".to_string(),
            response_parameters: map(&[(ALLOW_ORIGIN, "'*'".to_string())]),
            response_templates: map(&[(JSON, response_template(SHIP_PROFILE_TEMPLATE, config))]),
        },
    }
}

fn ship_photo(config: &ProjectConfig, role_arn: &str) -> EndpointSpec {
    EndpointSpec {
        resource_path: PHOTO_PATH.to_string(),
        method: get_method(true),
        integration: IntegrationSpec {
            kind: IntegrationKind::Aws,
            integration_http_method: Some("GET".to_string()),
            uri: Some(format!(
                "arn:aws:apigateway:{}:s3:path/{}/{{key}}",
                config.region(),
                config.bucket.name
            )),
            credentials: Some(role_arn.to_string()),
            request_parameters: map(&[(INTEGRATION_PATH_KEY, PATH_KEY.to_string())]),
            request_templates: BTreeMap::new(),
        },
        method_response: ok_response(&[(CONTENT_TYPE, false), (ALLOW_ORIGIN, false)]),
        integration_response: IntegrationResponseSpec {
            status_code: "200".to_string(),
            response_parameters: map(&[
                (
                    CONTENT_TYPE,
                    "integration.response.header.Content-Type".to_string(),
                ),
                (ALLOW_ORIGIN, "'*'".to_string()),
            ]),
            response_templates: BTreeMap::new(),
        },
    }
}

/// Preflight `OPTIONS` answered by a mock integration.
pub fn cors_preflight(resource_path: &str) -> EndpointSpec {
    EndpointSpec {
        resource_path: resource_path.to_string(),
        method: MethodSpec {
            http_method: "OPTIONS".to_string(),
            api_key_required: false,
            request_parameters: BTreeMap::new(),
        },
        integration: IntegrationSpec {
            kind: IntegrationKind::Mock,
            integration_http_method: None,
            uri: None,
            credentials: None,
            request_parameters: BTreeMap::new(),
            request_templates: map(&[(JSON, r#"{"statusCode": 200}"#.to_string())]),
        },
        method_response: ok_response(&[
            (ALLOW_HEADERS, false),
            (ALLOW_METHODS, false),
            (ALLOW_ORIGIN, false),
        ]),
        integration_response: IntegrationResponseSpec {
            status_code: "200".to_string(),
            response_parameters: map(&[
                (
                    ALLOW_HEADERS,
                    "'Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token'"
                        .to_string(),
                ),
                (ALLOW_METHODS, "'GET,OPTIONS'".to_string()),
                (ALLOW_ORIGIN, "'*'".to_string()),
            ]),
            response_templates: BTreeMap::new(),
        },
    }
}

pub fn ships_api(config: &ProjectConfig, roles: &RoleArns) -> ApiBlueprint {
    ApiBlueprint {
        resources: vec![
            SHIPS_PATH.to_string(),
            "/ships/profile".to_string(),
            PROFILE_PATH.to_string(),
            "/ships/photo".to_string(),
            PHOTO_PATH.to_string(),
        ],
        endpoints: vec![
            list_ships(config, &roles.dynamodb),
            ship_profile(config, &roles.dynamodb),
            ship_photo(config, &roles.s3),
        ],
        cors: [SHIPS_PATH, PROFILE_PATH, PHOTO_PATH]
            .into_iter()
            .map(cors_preflight)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles() -> RoleArns {
        RoleArns {
            dynamodb: "arn:aws:iam::123456789012:role/APIGatewayDynamoDBServiceRole".to_string(),
            s3: "arn:aws:iam::123456789012:role/APIGatewayS3ServiceRole".to_string(),
        }
    }

    #[test]
    fn test_split_resource_path() {
        assert_eq!(split_resource_path("/ships"), ("/", "ships"));
        assert_eq!(split_resource_path("/ships/profile"), ("/ships", "profile"));
        assert_eq!(
            split_resource_path("/ships/photo/{key}"),
            ("/ships/photo", "{key}")
        );
    }

    #[test]
    fn test_resources_are_ordered_parent_first() {
        let blueprint = ships_api(&ProjectConfig::default(), &roles());
        for (index, path) in blueprint.resources.iter().enumerate() {
            let (parent, _) = split_resource_path(path);
            assert!(parent == "/" || blueprint.resources[..index].iter().any(|p| p == parent));
        }
    }

    #[test]
    fn test_list_endpoint_scans_configured_table() {
        let blueprint = ships_api(&ProjectConfig::default(), &roles());
        let list = &blueprint.endpoints[0];

        assert_eq!(list.label(), "GET /ships");
        assert!(list.method.api_key_required);
        assert_eq!(
            list.integration.uri.as_deref(),
            Some("arn:aws:apigateway:eu-west-1:dynamodb:action/Scan")
        );
        assert_eq!(
            list.integration.request_templates[JSON],
            r#"{"TableName":"ShipsTable"}"#
        );
        assert_eq!(list.integration.credentials.as_deref(), Some(roles().dynamodb.as_str()));
        assert!(list.integration_response.response_templates[JSON].contains("$inputRoot.Items"));
    }

    #[test]
    fn test_profile_endpoint_reads_key_from_path() {
        let blueprint = ships_api(&ProjectConfig::default(), &roles());
        let profile = &blueprint.endpoints[1];

        assert_eq!(profile.method.request_parameters.get(PATH_KEY), Some(&true));
        let template: serde_json::Value =
            serde_json::from_str(&profile.integration.request_templates[JSON]).unwrap();
        assert_eq!(template["TableName"], "ShipsTable");
        assert_eq!(template["Key"]["id"]["S"], "$input.params('key')");
    }

    #[test]
    fn test_response_templates_follow_partition_key() {
        let mut config = ProjectConfig::default();
        config.table.partition_key = "ship_id".to_string();
        let blueprint = ships_api(&config, &roles());

        let list = &blueprint.endpoints[0].integration_response.response_templates[JSON];
        let profile = &blueprint.endpoints[1].integration_response.response_templates[JSON];
        assert!(list.contains(r#""id": "$item.ship_id.S""#));
        assert!(profile.contains(r#""id": "$inputRoot.Item.ship_id.S""#));
        assert!(!list.contains("{partition_key}"));
        assert!(!profile.contains("$inputRoot.Item.id.S"));
    }

    #[test]
    fn test_photo_endpoint_proxies_bucket() {
        let blueprint = ships_api(&ProjectConfig::default(), &roles());
        let photo = &blueprint.endpoints[2];

        assert_eq!(
            photo.integration.uri.as_deref(),
            Some("arn:aws:apigateway:eu-west-1:s3:path/ships-capstone-project-bucket/{key}")
        );
        assert_eq!(photo.integration.integration_http_method.as_deref(), Some("GET"));
        assert_eq!(photo.integration.credentials.as_deref(), Some(roles().s3.as_str()));
        assert_eq!(
            photo.integration_response.response_parameters[CONTENT_TYPE],
            "integration.response.header.Content-Type"
        );
    }

    #[test]
    fn test_cors_on_every_endpoint_resource() {
        let blueprint = ships_api(&ProjectConfig::default(), &roles());
        let cors_paths: Vec<&str> = blueprint
            .cors
            .iter()
            .map(|c| c.resource_path.as_str())
            .collect();
        assert_eq!(cors_paths, vec![SHIPS_PATH, PROFILE_PATH, PHOTO_PATH]);

        let preflight = &blueprint.cors[0];
        assert_eq!(preflight.method.http_method, "OPTIONS");
        assert!(!preflight.method.api_key_required);
        assert_eq!(preflight.integration.kind, IntegrationKind::Mock);
        assert_eq!(
            preflight.integration_response.response_parameters[ALLOW_METHODS],
            "'GET,OPTIONS'"
        );
    }
}
