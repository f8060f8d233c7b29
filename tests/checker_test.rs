use anyhow::Result;
use cloud_labs::core::checker::ApiChecker;
use cloud_labs::LabError;
use httpmock::prelude::*;
use serde_json::json;

fn ship(id: &str, key: &str) -> serde_json::Value {
    json!({
        "id": id,
        "nom": "Le Pecheur",
        "type": "pecheur",
        "pavillon": "France",
        "taille": 18,
        "nombre_marins": 6,
        "s3_image_key": key
    })
}

#[tokio::test]
async fn test_check_walks_list_profile_and_photo() -> Result<()> {
    let server = MockServer::start();

    let list_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/dev/ships")
            .header("x-api-key", "secret");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({ "ships": [ship("b-001", "pecheur-b-001.jpg")] }));
    });
    let profile_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/dev/ships/profile/b-001")
            .header("x-api-key", "secret");
        then.status(200).json_body(ship("b-001", "pecheur-b-001.jpg"));
    });
    let photo_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/dev/ships/photo/pecheur-b-001.jpg")
            .header("x-api-key", "secret");
        then.status(200)
            .header("Content-Type", "image/jpeg")
            .body("jpeg-bytes");
    });

    let checker = ApiChecker::new(&server.url("/dev/"), "secret")?;
    let report = checker.run().await?;

    list_mock.assert();
    profile_mock.assert();
    photo_mock.assert();
    assert_eq!(report.ships.len(), 1);
    assert_eq!(report.ships[0].kind, "pecheur");
    assert_eq!(report.profile_checked.as_deref(), Some("b-001"));
    assert_eq!(report.photo_bytes, Some(10));
    Ok(())
}

#[tokio::test]
async fn test_check_with_empty_catalog_stops_after_list() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/dev/ships");
        then.status(200).json_body(json!({ "ships": [] }));
    });

    let report = ApiChecker::new(&server.url("/dev"), "secret")
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(report.ships.is_empty());
    assert_eq!(report.profile_checked, None);
    assert_eq!(report.photo_bytes, None);
}

#[tokio::test]
async fn test_check_reports_rejected_key() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/dev/ships");
        then.status(403).json_body(json!({ "message": "Forbidden" }));
    });

    let err = ApiChecker::new(&server.url("/dev"), "wrong")
        .unwrap()
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, LabError::HttpError(_)));
}

#[tokio::test]
async fn test_check_rejects_mismatched_profile() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/dev/ships");
        then.status(200)
            .json_body(json!({ "ships": [ship("b-001", "pecheur-b-001.jpg")] }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/dev/ships/profile/b-001");
        then.status(200).json_body(ship("b-002", "tanker-b-002.jpg"));
    });

    let err = ApiChecker::new(&server.url("/dev"), "secret")
        .unwrap()
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, LabError::ProvisioningError { .. }));
}
