//! Integration tests for the MDM endpoint family using wiremock.
//!
//! Each test checks that the function builds the expected method, path,
//! query and body, and returns the decoded response.

mod common;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ws1_uem::mdm::*;

#[tokio::test(flavor = "multi_thread")]
async fn retrieve_device_information_by_serial() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/API/mdm/devices/serialnumber/C02XK0ABJG5J"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Id": {"Value": 1042},
            "SerialNumber": "C02XK0ABJG5J",
            "Platform": "AppleOsX"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let device = common::with_client(&server, |client| {
        retrieve_device_information(client, "C02XK0ABJG5J")
    })
    .await
    .unwrap();

    assert_eq!(device["Id"]["Value"], 1042);
    assert_eq!(device["Platform"], "AppleOsX");
}

#[tokio::test(flavor = "multi_thread")]
async fn extensive_search_uses_identifier_kind() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/API/mdm/devices/extensivesearch"))
        .and(query_param("serialNumber", "R58N"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"Devices": [{"DeviceId": 7}]})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/API/mdm/devices/extensivesearch"))
        .and(query_param("deviceId", "7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"Devices": [{"DeviceId": 7}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (by_serial, by_id) = common::with_client(&server, |client| {
        (
            extensive_search_device(client, &DeviceLookup::SerialNumber("R58N".into())),
            extensive_search_device(client, &DeviceLookup::DeviceId("7".into())),
        )
    })
    .await;

    assert_eq!(by_serial.unwrap()["Devices"][0]["DeviceId"], 7);
    assert_eq!(by_id.unwrap()["Devices"][0]["DeviceId"], 7);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_smart_group_posts_pascal_case_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/API/mdm/smartgroups"))
        .and(body_json(json!({
            "Name": "Pilot",
            "ManagedByOrganizationGroupId": 570,
            "UserGroups": [{"Id": "4021"}]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"Value": 88})))
        .expect(1)
        .mount(&server)
        .await;

    let created = common::with_client(&server, |client| {
        create_smart_group(client, &CreateSmartGroupRequest::new("Pilot", "4021", 570))
    })
    .await
    .unwrap();
    assert_eq!(created["Value"], 88);
}

#[tokio::test(flavor = "multi_thread")]
async fn change_organization_group_sends_query() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/API/mdm/devices/commands/changeorganizationgroup"))
        .and(query_param("searchby", "Serialnumber"))
        .and(query_param("id", "R58N"))
        .and(query_param("ogid", "612"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let body = common::with_client(&server, |client| change_organization_group(client, "R58N", 612))
        .await
        .unwrap();
    assert_eq!(body, json!({}));
}

#[tokio::test(flavor = "multi_thread")]
async fn device_commands_use_command_query() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/API/mdm/devices/31/commands"))
        .and(query_param("command", "ClearPasscode"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/API/mdm/devices/31/commands"))
        .and(query_param("command", "DeviceWipe"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let (clear, wipe) = common::with_client(&server, |client| {
        (clear_device_passcode(client, "31"), device_wipe(client, "31"))
    })
    .await;
    clear.unwrap();
    wipe.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn device_wipe_is_not_repeated_after_bad_gateway() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/API/mdm/devices/31/commands"))
        .and(query_param("command", "DeviceWipe"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let err = common::with_client(&server, |client| device_wipe(client, "31"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::BAD_GATEWAY));
}

#[tokio::test(flavor = "multi_thread")]
async fn serial_with_reserved_characters_stays_one_segment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/API/mdm/devices/serialnumber/C02%2F9%23A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"SerialNumber": "C02/9#A"})))
        .expect(1)
        .mount(&server)
        .await;

    let device = common::with_client(&server, |client| {
        retrieve_device_information(client, "C02/9#A")
    })
    .await
    .unwrap();
    assert_eq!(device["SerialNumber"], "C02/9#A");
}

#[tokio::test(flavor = "multi_thread")]
async fn tag_membership_uses_bulk_values() {
    let server = MockServer::start().await;
    let devices = vec!["101".to_string(), "102".to_string()];

    Mock::given(method("POST"))
        .and(path("/API/mdm/tags/9/adddevices"))
        .and(body_json(json!({"BulkValues": {"Value": ["101", "102"]}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"AcceptedItems": 2})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/API/mdm/tags/9/removedevices"))
        .and(body_json(json!({"BulkValues": {"Value": ["101", "102"]}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"AcceptedItems": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let (added, removed) = common::with_client(&server, move |client| {
        (
            add_devices_to_tag(client, 9, &devices),
            remove_devices_from_tag(client, 9, &devices),
        )
    })
    .await;
    assert_eq!(added.unwrap()["AcceptedItems"], 2);
    assert_eq!(removed.unwrap()["AcceptedItems"], 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn reprocess_product_forces_each_device() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/API/mdm/products/reprocessProduct"))
        .and(body_json(json!({
            "ForceFlag": true,
            "DeviceIds": [{"ID": "5"}],
            "ProductID": 14
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    common::with_client(&server, |client| {
        initiate_product_reprocessing(client, &["5".to_string()], 14)
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn install_profile_posts_serial() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/API/mdm/profiles/300/install"))
        .and(body_json(json!({"SerialNumber": "R58N"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    common::with_client(&server, |client| install_profile(client, "R58N", 300))
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn smart_group_read_and_update_round_trip() {
    let server = MockServer::start().await;
    let group = json!({"SmartGroupID": 88, "Name": "Pilot", "Devices": []});

    Mock::given(method("GET"))
        .and(path("/API/mdm/smartgroups/88"))
        .respond_with(ResponseTemplate::new(200).set_body_json(group.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/API/mdm/smartgroups/88"))
        .and(body_json(json!({"SmartGroupID": 88, "Name": "Pilot v2", "Devices": []})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let updated = common::with_client(&server, |client| {
        let mut group = get_smart_group(client, 88)?;
        group["Name"] = json!("Pilot v2");
        update_smart_group(client, 88, &group)
    })
    .await
    .unwrap();
    assert_eq!(updated, json!({}));
}

#[tokio::test(flavor = "multi_thread")]
async fn device_health_check_pages_by_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/API/mdm/products/devicehealthcheck"))
        .and(query_param("organizationgroupid", "570"))
        .and(query_param("page", "2"))
        .and(query_param("pagesize", "500"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"Total": 1200, "Devices": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = common::with_client(&server, |client| get_device_health_check(client, "570", 500, 2))
        .await
        .unwrap();
    assert_eq!(page["Total"], 1200);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_product_details_assigns_smart_group() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/API/mdm/products/14/update"))
        .and(body_json(json!({"SmartGroups": {"SmartGroupID": "88"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Value": true})))
        .expect(1)
        .mount(&server)
        .await;

    let result = common::with_client(&server, |client| update_product_details(client, 14, "88"))
        .await
        .unwrap();
    assert_eq!(result["Value"], true);
}

#[tokio::test(flavor = "multi_thread")]
async fn device_update_network_and_delete() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/API/mdm/devices/31"))
        .and(body_json(json!({"AssetNumber": "LT-0042"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/API/mdm/devices/31/network"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "WifiInfo": {"SSID": "corp"},
            "IPAddress": {"WifiIPAddress": "10.0.0.12"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/API/mdm/devices/31"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let network = common::with_client(&server, |client| {
        update_device(client, "31", &json!({"AssetNumber": "LT-0042"}))?;
        let network = get_device_network_info(client, "31")?;
        delete_device(client, "31")?;
        Ok::<_, ws1_uem::error::UemError>(network)
    })
    .await
    .unwrap();
    assert_eq!(network["WifiInfo"]["SSID"], "corp");
}
