//! Mobile device management endpoints (`/API/mdm/...`).
//!
//! | Function | Method | Path |
//! |---|---|---|
//! | [`create_smart_group`] | POST | `mdm/smartgroups` |
//! | [`get_smart_group`] | GET | `mdm/smartgroups/{id}` |
//! | [`update_smart_group`] | PUT | `mdm/smartgroups/{id}` |
//! | [`update_product_details`] | POST | `mdm/products/{id}/update` |
//! | [`initiate_product_reprocessing`] | POST | `mdm/products/reprocessProduct` |
//! | [`get_device_health_check`] | GET | `mdm/products/devicehealthcheck` |
//! | [`retrieve_device_information`] | GET | `mdm/devices/serialnumber/{serial}` |
//! | [`extensive_search_device`] | GET | `mdm/devices/extensivesearch` |
//! | [`delete_device`] | DELETE | `mdm/devices/{id}` |
//! | [`update_device`] | PUT | `mdm/devices/{id}` |
//! | [`change_organization_group`] | POST | `mdm/devices/commands/changeorganizationgroup` |
//! | [`add_devices_to_tag`] | POST | `mdm/tags/{id}/adddevices` |
//! | [`remove_devices_from_tag`] | POST | `mdm/tags/{id}/removedevices` |
//! | [`clear_device_passcode`] | POST | `mdm/devices/{id}/commands?command=ClearPasscode` |
//! | [`device_wipe`] | POST | `mdm/devices/{id}/commands?command=DeviceWipe` |
//! | [`get_device_network_info`] | GET | `mdm/devices/{id}/network` |
//! | [`install_profile`] | POST | `mdm/profiles/{id}/install` |
//!
//! Every function returns the decoded JSON body; endpoints that answer with
//! an empty body yield `{}`.

use serde::Serialize;
use serde_json::Value;

use crate::client::{ApiRequest, UemClient};

// ── Request types ──────────────────────────────────────────────────────

/// Body for [`create_smart_group`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSmartGroupRequest {
    /// Display name of the new smart group.
    pub name: String,
    /// Organization group that owns the smart group.
    pub managed_by_organization_group_id: i64,
    /// User groups whose members' devices are included.
    pub user_groups: Vec<IdRef>,
}

impl CreateSmartGroupRequest {
    /// Smart group scoped to a single user group.
    pub fn new(
        name: impl Into<String>,
        user_group_id: impl Into<String>,
        managed_by_og_id: i64,
    ) -> Self {
        CreateSmartGroupRequest {
            name: name.into(),
            managed_by_organization_group_id: managed_by_og_id,
            user_groups: vec![IdRef {
                id: user_group_id.into(),
            }],
        }
    }
}

/// `{"Id": "..."}` reference used inside smart group bodies.
#[derive(Debug, Clone, Serialize)]
pub struct IdRef {
    /// Referenced entity id.
    #[serde(rename = "Id")]
    pub id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ProductSmartGroups<'a> {
    smart_groups: SmartGroupId<'a>,
}

#[derive(Serialize)]
struct SmartGroupId<'a> {
    #[serde(rename = "SmartGroupID")]
    smart_group_id: &'a str,
}

#[derive(Serialize)]
struct ReprocessProduct<'a> {
    #[serde(rename = "ForceFlag")]
    force_flag: bool,
    #[serde(rename = "DeviceIds")]
    device_ids: Vec<DeviceIdRef<'a>>,
    #[serde(rename = "ProductID")]
    product_id: i64,
}

#[derive(Serialize)]
struct DeviceIdRef<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
}

/// `{"BulkValues": {"Value": [...]}}`, shared with the registered-device
/// bulk delete in [`crate::system`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct BulkValues<'a> {
    pub(crate) bulk_values: BulkValueList<'a>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct BulkValueList<'a> {
    pub(crate) value: &'a [String],
}

impl<'a> BulkValues<'a> {
    pub(crate) fn new(value: &'a [String]) -> Self {
        BulkValues {
            bulk_values: BulkValueList { value },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InstallProfile<'a> {
    serial_number: &'a str,
}

/// Identifier accepted by the extensive device search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceLookup {
    /// Hardware serial number.
    SerialNumber(String),
    /// UEM device id.
    DeviceId(String),
}

impl DeviceLookup {
    fn query(&self) -> (&'static str, &str) {
        match self {
            DeviceLookup::SerialNumber(serial) => ("serialNumber", serial.as_str()),
            DeviceLookup::DeviceId(id) => ("deviceId", id.as_str()),
        }
    }
}

// ── Smart groups ───────────────────────────────────────────────────────

/// Creates a smart group.
///
/// # Errors
///
/// Any [`UemClient::send`] error.
pub fn create_smart_group(
    client: &UemClient,
    request: &CreateSmartGroupRequest,
) -> crate::error::Result<Value> {
    client.post("mdm/smartgroups", request)
}

/// Retrieves a smart group by id.
///
/// # Errors
///
/// Any [`UemClient::send`] error; 404 when the id is unknown.
pub fn get_smart_group(client: &UemClient, smart_group_id: i64) -> crate::error::Result<Value> {
    client.send(ApiRequest::get("mdm/smartgroups").segment(smart_group_id))
}

/// Replaces a smart group definition. `smart_group` is sent as-is, usually
/// a modified copy of what [`get_smart_group`] returned.
pub fn update_smart_group(
    client: &UemClient,
    smart_group_id: i64,
    smart_group: &Value,
) -> crate::error::Result<Value> {
    client.send(ApiRequest::put("mdm/smartgroups").segment(smart_group_id).json(smart_group)?)
}

// ── Products ───────────────────────────────────────────────────────────

/// Assigns a product to a smart group.
pub fn update_product_details(
    client: &UemClient,
    product_id: i64,
    smart_group_id: &str,
) -> crate::error::Result<Value> {
    let body = ProductSmartGroups {
        smart_groups: SmartGroupId { smart_group_id },
    };
    let request = ApiRequest::post("mdm/products")
        .segment(product_id)
        .segment("update")
        .json(&body)?;
    client.send(request)
}

/// Forces reprocessing of a product on the given devices.
pub fn initiate_product_reprocessing(
    client: &UemClient,
    device_ids: &[String],
    product_id: i64,
) -> crate::error::Result<Value> {
    let body = ReprocessProduct {
        force_flag: true,
        device_ids: device_ids.iter().map(|id| DeviceIdRef { id }).collect(),
        product_id,
    };
    client.post("mdm/products/reprocessProduct", &body)
}

/// Reads one page of the product device health check report.
///
/// The response carries `Total` (devices across all pages) and `Devices`
/// (this page). See [`crate::health::collect_device_health`] for paging.
pub fn get_device_health_check(
    client: &UemClient,
    organization_group_id: &str,
    page_size: u32,
    page: u32,
) -> crate::error::Result<Value> {
    client.send(
        ApiRequest::get("mdm/products/devicehealthcheck")
            .query("organizationgroupid", organization_group_id)
            .query("page", page)
            .query("pagesize", page_size),
    )
}

// ── Devices ────────────────────────────────────────────────────────────

/// Retrieves device details by serial number.
///
/// # Errors
///
/// Any [`UemClient::send`] error; 404 when no device has that serial.
pub fn retrieve_device_information(
    client: &UemClient,
    serial_number: &str,
) -> crate::error::Result<Value> {
    client.send(ApiRequest::get("mdm/devices/serialnumber").segment(serial_number))
}

/// Runs the extensive device search for one serial number or device id.
pub fn extensive_search_device(
    client: &UemClient,
    lookup: &DeviceLookup,
) -> crate::error::Result<Value> {
    let (key, value) = lookup.query();
    client.send(ApiRequest::get("mdm/devices/extensivesearch").query(key, value))
}

/// Deletes a device record.
pub fn delete_device(client: &UemClient, device_id: &str) -> crate::error::Result<Value> {
    client.send(ApiRequest::delete("mdm/devices").segment(device_id))
}

/// Updates device attributes; `details` is sent as-is.
pub fn update_device(
    client: &UemClient,
    device_id: &str,
    details: &Value,
) -> crate::error::Result<Value> {
    client.send(ApiRequest::put("mdm/devices").segment(device_id).json(details)?)
}

/// Moves the device with `serial_number` into organization group `og_id`.
pub fn change_organization_group(
    client: &UemClient,
    serial_number: &str,
    og_id: i64,
) -> crate::error::Result<Value> {
    client.send(
        ApiRequest::post("mdm/devices/commands/changeorganizationgroup")
            .query("searchby", "Serialnumber")
            .query("id", serial_number)
            .query("ogid", og_id),
    )
}

/// Sends the `ClearPasscode` command.
pub fn clear_device_passcode(client: &UemClient, device_id: &str) -> crate::error::Result<Value> {
    device_command(client, device_id, "ClearPasscode")
}

/// Sends the `DeviceWipe` command. This erases the device.
pub fn device_wipe(client: &UemClient, device_id: &str) -> crate::error::Result<Value> {
    device_command(client, device_id, "DeviceWipe")
}

fn device_command(
    client: &UemClient,
    device_id: &str,
    command: &str,
) -> crate::error::Result<Value> {
    let request = ApiRequest::post("mdm/devices")
        .segment(device_id)
        .segment("commands")
        .query("command", command);
    client.send(request)
}

/// Retrieves network details (IP addresses, Wi-Fi, cellular) of a device.
pub fn get_device_network_info(client: &UemClient, device_id: &str) -> crate::error::Result<Value> {
    client.send(ApiRequest::get("mdm/devices").segment(device_id).segment("network"))
}

// ── Tags ───────────────────────────────────────────────────────────────

/// Adds devices to a tag.
pub fn add_devices_to_tag(
    client: &UemClient,
    tag_id: i64,
    device_ids: &[String],
) -> crate::error::Result<Value> {
    tag_membership(client, tag_id, "adddevices", device_ids)
}

/// Removes devices from a tag.
pub fn remove_devices_from_tag(
    client: &UemClient,
    tag_id: i64,
    device_ids: &[String],
) -> crate::error::Result<Value> {
    tag_membership(client, tag_id, "removedevices", device_ids)
}

fn tag_membership(
    client: &UemClient,
    tag_id: i64,
    action: &str,
    device_ids: &[String],
) -> crate::error::Result<Value> {
    let request = ApiRequest::post("mdm/tags")
        .segment(tag_id)
        .segment(action)
        .json(&BulkValues::new(device_ids))?;
    client.send(request)
}

// ── Profiles ───────────────────────────────────────────────────────────

/// Installs a profile on the device with `serial_number`.
pub fn install_profile(
    client: &UemClient,
    serial_number: &str,
    profile_id: i64,
) -> crate::error::Result<Value> {
    let request = ApiRequest::post("mdm/profiles")
        .segment(profile_id)
        .segment("install")
        .json(&InstallProfile { serial_number })?;
    client.send(request)
}
