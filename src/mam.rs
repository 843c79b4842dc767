//! Mobile application management endpoints (`/API/mam/...`).
//!
//! Internal (in-house) Android applications go through a two-step flow:
//! [`upload_blob`] stores the APK and returns a blob id, then
//! [`install_blob`] turns that blob into an internal application. The
//! assignment functions attach the resulting app to smart groups.
//!
//! | Function | Method | Path |
//! |---|---|---|
//! | [`upload_blob`] | POST (multipart) | `mam/blobs/uploadblob` |
//! | [`install_blob`] | POST | `mam/apps/internal/begininstall` |
//! | [`assign_internal_app`] | POST | `mam/apps/internal/{id}/assignments` |
//! | [`delete_internal_app_assignments`] | DELETE | `mam/apps/internal/{id}/assignments` |
//! | [`edit_internal_app_assignments`] | PUT | `mam/apps/internal/{id}/assignments` |
//! | [`update_internal_app_assignments`] | PUT | `mam/apps/internal/{id}/assignments` |
//! | [`get_internal_app`] | GET | `mam/apps/internal/{id}` |
//! | [`retire_internal_app`] | POST | `mam/apps/internal/{id}/retire` |
//! | [`delete_internal_app`] | DELETE | `mam/apps/internal/{id}` |
//! | [`search_application_by_bundle_id`] | GET | `mam/apps/search` |
//! | [`import_approved_android_app`] | POST | `groups/{uuid}/androidwork/apps/import` |

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::client::{ApiRequest, FilePayload, UemClient};

/// UEM device type code for Android.
pub const ANDROID_DEVICE_TYPE: u32 = 5;

// ── Request types ──────────────────────────────────────────────────────

/// Parameters for [`install_blob`].
#[derive(Debug, Clone)]
pub struct InstallBlobRequest {
    /// Blob id returned by [`upload_blob`] (the `Value` field).
    pub blob_id: String,
    /// Display name of the application.
    pub application_name: String,
    /// `Auto` or `OnDemand`.
    pub push_mode: String,
    /// Whether devices on an older version receive updates automatically.
    pub auto_update_version: bool,
    /// Organization group the app is created in.
    pub location_group_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct BeginInstall<'a> {
    device_type: u32,
    blob_id: &'a str,
    application_name: &'a str,
    enable_provisioning: bool,
    supported_models: SupportedModels,
    push_mode: &'a str,
    auto_update_version: bool,
    #[serde(rename = "LocationGroupID")]
    location_group_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SupportedModels {
    model: Vec<Model>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Model {
    model_id: u32,
    model_name: &'static str,
}

impl<'a> From<&'a InstallBlobRequest> for BeginInstall<'a> {
    fn from(request: &'a InstallBlobRequest) -> Self {
        BeginInstall {
            device_type: ANDROID_DEVICE_TYPE,
            blob_id: &request.blob_id,
            application_name: &request.application_name,
            enable_provisioning: false,
            supported_models: SupportedModels {
                model: vec![Model {
                    model_id: ANDROID_DEVICE_TYPE,
                    model_name: "Android",
                }],
            },
            push_mode: &request.push_mode,
            auto_update_version: request.auto_update_version,
            location_group_id: &request.location_group_id,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct NewAssignment<'a> {
    deployment_parameters: NewDeployment<'a>,
    smart_group_ids: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct NewDeployment<'a> {
    effective_date: &'a str,
    push_mode: &'static str,
    remove_on_un_enroll: bool,
}

#[derive(Serialize)]
struct RemoveAssignments<'a> {
    #[serde(rename = "SmartGroupIDs")]
    smart_group_ids: &'a [String],
    id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct EditAssignments<'a> {
    deployment_parameters: ManagedDeployment,
    smart_group_ids: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    smart_group_ids_for_deletion: Option<&'a [String]>,
}

/// Deployment settings applied whenever assignments are edited.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ManagedDeployment {
    adaptive_management: bool,
    application_backup: bool,
    auto_update_devices_with_previous_version: bool,
    push_mode: &'static str,
    remove_on_un_enroll: bool,
    allow_management: bool,
    rank: u32,
}

impl Default for ManagedDeployment {
    fn default() -> Self {
        ManagedDeployment {
            adaptive_management: true,
            application_backup: false,
            auto_update_devices_with_previous_version: true,
            push_mode: "Auto",
            remove_on_un_enroll: true,
            allow_management: true,
            rank: 0,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportApp<'a> {
    application_id: &'a str,
    device_type: &'a str,
}

// ── Blobs and installs ─────────────────────────────────────────────────

/// Uploads an application binary as a blob.
///
/// The file is sent as the `file` part of a multipart form. The response's
/// `Value` field is the blob id to pass to [`install_blob`].
///
/// # Errors
///
/// Any [`UemClient::send`] error.
pub fn upload_blob(
    client: &UemClient,
    file: FilePayload,
    organization_group_id: &str,
) -> crate::error::Result<Value> {
    let request = ApiRequest::post("mam/blobs/uploadblob")
        .query("filename", file.file_name.clone())
        .query("organizationgroupid", organization_group_id)
        .query("moduleType", "Application")
        .file(file);
    client.send(request)
}

/// Creates an internal Android application from an uploaded blob.
pub fn install_blob(
    client: &UemClient,
    request: &InstallBlobRequest,
) -> crate::error::Result<Value> {
    client.post("mam/apps/internal/begininstall", &BeginInstall::from(request))
}

// ── Assignments ────────────────────────────────────────────────────────

/// Assigns an internal app to smart groups with automatic push, effective
/// from `effective_date` (ISO 8601).
pub fn assign_internal_app(
    client: &UemClient,
    app_id: &str,
    smart_group_ids: &[String],
    effective_date: &str,
) -> crate::error::Result<Value> {
    let body = NewAssignment {
        deployment_parameters: NewDeployment {
            effective_date,
            push_mode: "Auto",
            remove_on_un_enroll: true,
        },
        smart_group_ids,
    };
    client.send(assignments(Method::POST, app_id).json(&body)?)
}

/// Removes the listed smart group assignments from an internal app.
pub fn delete_internal_app_assignments(
    client: &UemClient,
    app_id: &str,
    smart_group_ids: &[String],
) -> crate::error::Result<Value> {
    let body = RemoveAssignments {
        smart_group_ids,
        id: app_id,
    };
    client.send(assignments(Method::DELETE, app_id).json(&body)?)
}

/// Replaces the smart group assignments of an internal app.
pub fn edit_internal_app_assignments(
    client: &UemClient,
    app_id: &str,
    smart_group_ids: &[String],
) -> crate::error::Result<Value> {
    let body = EditAssignments {
        deployment_parameters: ManagedDeployment::default(),
        smart_group_ids,
        smart_group_ids_for_deletion: None,
    };
    client.send(assignments(Method::PUT, app_id).json(&body)?)
}

/// Adds `smart_group_ids` and drops `removed_smart_group_ids` in one call.
pub fn update_internal_app_assignments(
    client: &UemClient,
    app_id: &str,
    smart_group_ids: &[String],
    removed_smart_group_ids: &[String],
) -> crate::error::Result<Value> {
    let body = EditAssignments {
        deployment_parameters: ManagedDeployment::default(),
        smart_group_ids,
        smart_group_ids_for_deletion: Some(removed_smart_group_ids),
    };
    client.send(assignments(Method::PUT, app_id).json(&body)?)
}

fn assignments(method: Method, app_id: &str) -> ApiRequest {
    ApiRequest::new(method, "mam/apps/internal")
        .segment(app_id)
        .segment("assignments")
}

// ── Internal apps ──────────────────────────────────────────────────────

/// Retrieves an internal application.
pub fn get_internal_app(client: &UemClient, app_id: &str) -> crate::error::Result<Value> {
    client.send(ApiRequest::get("mam/apps/internal").segment(app_id))
}

/// Retires an internal application.
pub fn retire_internal_app(client: &UemClient, app_id: &str) -> crate::error::Result<Value> {
    client.send(ApiRequest::post("mam/apps/internal").segment(app_id).segment("retire"))
}

/// Deletes an internal application.
pub fn delete_internal_app(client: &UemClient, app_id: &str) -> crate::error::Result<Value> {
    client.send(ApiRequest::delete("mam/apps/internal").segment(app_id))
}

/// Searches applications by bundle id (package name).
pub fn search_application_by_bundle_id(
    client: &UemClient,
    bundle_id: &str,
) -> crate::error::Result<Value> {
    client.send(ApiRequest::get("mam/apps/search").query("bundleid", bundle_id))
}

/// Imports a managed Google Play app into the organization group `og_uuid`.
pub fn import_approved_android_app(
    client: &UemClient,
    og_uuid: &str,
    application_id: &str,
    device_type: &str,
) -> crate::error::Result<Value> {
    let body = ImportApp {
        application_id,
        device_type,
    };
    let request = ApiRequest::post("groups")
        .segment(og_uuid)
        .path_suffix("androidwork/apps/import");
    client.send(request.json(&body)?)
}
