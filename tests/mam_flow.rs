//! Integration tests for the MAM endpoint family using wiremock.
//!
//! Includes the multipart blob upload, which is the only call that does
//! not carry a JSON body.

mod common;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ws1_uem::client::FilePayload;
use ws1_uem::mam::*;

#[tokio::test(flavor = "multi_thread")]
async fn upload_blob_sends_multipart_file() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/API/mam/blobs/uploadblob"))
        .and(query_param("filename", "notes.apk"))
        .and(query_param("organizationgroupid", "570"))
        .and(query_param("moduleType", "Application"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Value": 7781})))
        .expect(1)
        .mount(&server)
        .await;

    let blob = common::with_client(&server, |client| {
        upload_blob(
            client,
            FilePayload::new("notes.apk", b"PK\x03\x04apk-bytes".to_vec()),
            "570",
        )
    })
    .await
    .unwrap();
    assert_eq!(blob["Value"], 7781);

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    let content_type = request.headers.get("content-type").unwrap().to_str().unwrap();
    assert!(
        content_type.starts_with("multipart/form-data; boundary="),
        "unexpected content type {content_type}"
    );
    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains(r#"name="file""#));
    assert!(body.contains(r#"filename="notes.apk""#));
    assert!(body.contains("apk-bytes"));
    assert!(request.headers.get("authorization").is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_is_not_resent_after_bad_gateway() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/API/mam/blobs/uploadblob"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let err = common::with_client(&server, |client| {
        upload_blob(client, FilePayload::new("a.apk", b"bytes".to_vec()), "570")
    })
    .await
    .unwrap_err();

    assert_eq!(err.status(), Some(reqwest::StatusCode::BAD_GATEWAY));
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(String::from_utf8_lossy(&requests[0].body).contains("bytes"));
}

#[tokio::test(flavor = "multi_thread")]
async fn install_blob_begins_android_install() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/API/mam/apps/internal/begininstall"))
        .and(body_json(json!({
            "DeviceType": 5,
            "BlobId": "7781",
            "ApplicationName": "Field Notes",
            "EnableProvisioning": false,
            "SupportedModels": {"Model": [{"ModelId": 5, "ModelName": "Android"}]},
            "PushMode": "OnDemand",
            "AutoUpdateVersion": false,
            "LocationGroupID": "570"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Id": {"Value": 301}})))
        .expect(1)
        .mount(&server)
        .await;

    let app = common::with_client(&server, |client| {
        install_blob(
            client,
            &InstallBlobRequest {
                blob_id: "7781".into(),
                application_name: "Field Notes".into(),
                push_mode: "OnDemand".into(),
                auto_update_version: false,
                location_group_id: "570".into(),
            },
        )
    })
    .await
    .unwrap();
    assert_eq!(app["Id"]["Value"], 301);
}

#[tokio::test(flavor = "multi_thread")]
async fn assignment_lifecycle() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/API/mam/apps/internal/301/assignments"))
        .and(body_json(json!({
            "DeploymentParameters": {
                "EffectiveDate": "2026-10-01T00:00:00",
                "PushMode": "Auto",
                "RemoveOnUnEnroll": true
            },
            "SmartGroupIds": ["88"]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/API/mam/apps/internal/301/assignments"))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/API/mam/apps/internal/301/assignments"))
        .and(body_json(json!({"SmartGroupIDs": ["88", "89"], "id": "301"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    common::with_client(&server, |client| {
        let groups = vec!["88".to_string()];
        assign_internal_app(client, "301", &groups, "2026-10-01T00:00:00")?;
        edit_internal_app_assignments(client, "301", &groups)?;
        update_internal_app_assignments(client, "301", &["89".to_string()], &groups)?;
        delete_internal_app_assignments(client, "301", &["88".to_string(), "89".to_string()])
    })
    .await
    .unwrap();

    let requests = server.received_requests().await.unwrap();
    let update: serde_json::Value = serde_json::from_slice(&requests[2].body).unwrap();
    assert_eq!(update["SmartGroupIds"], json!(["89"]));
    assert_eq!(update["SmartGroupIdsForDeletion"], json!(["88"]));
    assert_eq!(update["DeploymentParameters"]["AdaptiveManagement"], true);
}

#[tokio::test(flavor = "multi_thread")]
async fn internal_app_read_retire_delete() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/API/mam/apps/internal/301"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"ApplicationName": "Field Notes"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/API/mam/apps/internal/301/retire"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/API/mam/apps/internal/301"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let name = common::with_client(&server, |client| {
        let app = get_internal_app(client, "301")?;
        retire_internal_app(client, "301")?;
        delete_internal_app(client, "301")?;
        Ok::<_, ws1_uem::error::UemError>(app["ApplicationName"].clone())
    })
    .await
    .unwrap();
    assert_eq!(name, "Field Notes");
}

#[tokio::test(flavor = "multi_thread")]
async fn search_by_bundle_id_and_import() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/API/mam/apps/search"))
        .and(query_param("bundleid", "com.example.notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Application": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/API/groups/og-uuid/androidwork/apps/import"))
        .and(body_json(json!({"applicationId": "com.example.notes", "deviceType": "Android"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    common::with_client(&server, |client| {
        search_application_by_bundle_id(client, "com.example.notes")?;
        import_approved_android_app(client, "og-uuid", "com.example.notes", "Android")
    })
    .await
    .unwrap();
}
