//! System administration endpoints (`/API/system/...`).
//!
//! Grouped by endpoint family:
//!
//! - **User groups** — [`search_custom_user_group`], [`create_custom_user_group`],
//!   [`list_user_group_members`], [`delete_custom_user_group`],
//!   [`add_user_to_custom_group`], [`remove_user_from_custom_group`].
//! - **Enrollment users** — [`search_enrollment_user`], [`create_enrollment_user`],
//!   [`get_enrollment_user`], [`register_device_to_enrollment_user`],
//!   [`search_enrollment_tokens`], [`get_enrolled_devices`].
//! - **Organization groups** — [`get_organization_group`],
//!   [`list_child_organization_groups`], [`create_organization_group`],
//!   [`get_enrollment_customization_settings`], [`get_dropship_provisioning`],
//!   [`enable_dropship_provisioning_v1`].
//! - **Admins** — [`get_admin_identity`], [`search_admins`], [`get_admin`],
//!   [`delete_admin`], [`create_admin_user`], [`update_admin_user`],
//!   [`change_admin_password`], [`add_role_to_admin`], [`remove_role_from_admin`],
//!   [`get_admin_about_page_config`], [`update_admin_about_page_config`].
//! - **Event notifications** — the legacy route (`system/eventnotifications`)
//!   and the `V1` route (`system/eventnotifications/V1/eventnotifications`)
//!   are separate functions; the two routes are not interchangeable.
//! - **Device wipes** — [`get_device_wipe_events`], [`perform_device_wipe_action`],
//!   [`create_device_wipe_report`], [`get_device_wipe_lock_state`],
//!   [`reset_device_wipe_lock`].
//! - **Custom attributes** — [`search_custom_attributes`], [`create_custom_attribute`],
//!   [`create_enrollment_custom_attributes`], [`update_custom_attributes_by_serial`],
//!   [`delete_custom_attributes_by_serial`],
//!   [`create_custom_attributes_for_registered_device`],
//!   [`delete_custom_attributes_for_registered_device`].
//! - **Registered devices** — [`get_registered_devices`], [`delete_registered_devices`],
//!   [`delete_registered_devices_by_serial_number`],
//!   [`delete_registered_devices_by_udid`],
//!   [`delete_registered_devices_by_asset_number`].
//! - **LDAP sync** — [`get_advanced_ldap_sync_jobs`], [`create_advanced_ldap_sync_job`],
//!   [`get_advanced_ldap_sync_job_details`], [`approve_or_decline_ldap_sync_job`],
//!   [`get_ldap_sync_job_status`].
//!
//! Device wipe, dropship, enrollment customization and registered-device
//! custom attribute endpoints only exist in the versioned API surface and are
//! sent with `Accept: application/json;version=1`.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::client::{ApiRequest, UemClient};
use crate::mdm::BulkValues;

// ── User groups ────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CustomUserGroup<'a> {
    group_name: &'a str,
    description: &'a str,
    #[serde(rename = "ManagedByOrganizationGroupID")]
    managed_by_organization_group_id: &'a str,
}

/// Searches custom user groups by name.
///
/// # Errors
///
/// Any [`UemClient::send`] error.
pub fn search_custom_user_group(
    client: &UemClient,
    group_name: &str,
) -> crate::error::Result<Value> {
    client.send(ApiRequest::get("system/usergroups/custom/search").query("groupname", group_name))
}

/// Creates a custom user group owned by `organization_group_id`.
pub fn create_custom_user_group(
    client: &UemClient,
    group_name: &str,
    organization_group_id: &str,
    description: &str,
) -> crate::error::Result<Value> {
    let body = CustomUserGroup {
        group_name,
        description,
        managed_by_organization_group_id: organization_group_id,
    };
    client.post("system/usergroups/createcustomusergroup", &body)
}

/// Lists the members of a user group, up to `page_size` entries.
pub fn list_user_group_members(
    client: &UemClient,
    user_group_id: &str,
    page_size: u32,
) -> crate::error::Result<Value> {
    let request = ApiRequest::get("system/usergroups")
        .segment(user_group_id)
        .segment("users")
        .query("pagesize", page_size);
    client.send(request)
}

/// Deletes a custom user group.
pub fn delete_custom_user_group(
    client: &UemClient,
    user_group_id: &str,
) -> crate::error::Result<Value> {
    client.send(ApiRequest::delete("system/usergroups").segment(user_group_id).segment("delete"))
}

fn group_membership(user_group_id: &str, user_id: &str, action: &str) -> ApiRequest {
    ApiRequest::post("system/usergroups")
        .segment(user_group_id)
        .segment("user")
        .segment(user_id)
        .segment(action)
}

/// Adds an enrollment user to a custom user group.
pub fn add_user_to_custom_group(
    client: &UemClient,
    user_group_id: &str,
    user_id: &str,
) -> crate::error::Result<Value> {
    client.send(group_membership(user_group_id, user_id, "addusertogroup"))
}

/// Removes an enrollment user from a custom user group.
pub fn remove_user_from_custom_group(
    client: &UemClient,
    user_group_id: &str,
    user_id: &str,
) -> crate::error::Result<Value> {
    client.send(group_membership(user_group_id, user_id, "removeuserfromgroup"))
}

// ── Enrollment users ───────────────────────────────────────────────────

/// Body for [`create_enrollment_user`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateEnrollmentUserRequest {
    /// Login name.
    pub user_name: String,
    /// `true` for an active account.
    pub status: bool,
    /// Security type code (`1` directory, `2` basic).
    pub security_type: i64,
    /// Enrollment message channel, e.g. `Email`.
    pub message_type: String,
    /// Enrollment role name.
    pub role: String,
    /// Organization group the user is created in.
    pub location_group_id: String,
}

/// Body for [`register_device_to_enrollment_user`]. Every field is supplied
/// by the caller.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegisterDeviceRequest {
    /// Organization group of the device.
    pub location_group_id: String,
    /// Display name shown in the console.
    pub friendly_name: String,
    /// Ownership code, e.g. `C` (corporate) or `E` (employee).
    pub ownership: String,
    /// Platform id.
    pub platform_id: i64,
    /// Model id.
    pub model_id: i64,
    /// Operating system id.
    pub operating_system_id: i64,
    /// Device UDID.
    pub udid: String,
    /// Hardware serial number.
    pub serial_number: String,
    /// IMEI, for cellular devices.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imei: Option<String>,
    /// Asset number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_number: Option<String>,
    /// Enrollment message channel.
    pub message_type: String,
    /// Enrollment message template id.
    pub message_template_id: i64,
    /// SIM details.
    #[serde(rename = "SIM", skip_serializing_if = "Option::is_none")]
    pub sim: Option<String>,
    /// Recipient for an email enrollment message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_email_address: Option<String>,
    /// Recipient for an SMS enrollment message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_phone_number: Option<String>,
    /// Tags, e.g. `[{"Name": "Kiosk"}]`.
    pub tags: Vec<Value>,
    /// Custom attributes, e.g. `[{"uuid": "..."}]`.
    pub custom_attributes: Vec<Value>,
    /// Whether this registration migrates an existing device.
    pub is_migration: bool,
    /// Registration record uuid.
    #[serde(rename = "uuid", skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

/// Optional filters for [`search_enrollment_tokens`].
#[derive(Debug, Clone, Default)]
pub struct EnrollmentTokenSearch {
    /// Enrollment user name.
    pub username: Option<String>,
    /// Enrollment user id.
    pub userid: Option<String>,
    /// Organization group id.
    pub organizationgroupid: Option<String>,
    /// Organization group name.
    pub organizationgroup: Option<String>,
    /// Device serial number.
    pub serialnumber: Option<String>,
    /// Device asset number.
    pub assetnumber: Option<String>,
    /// Enrollment status id.
    pub enrollmentstatusid: Option<String>,
    /// Compliance status id.
    pub compliancestatusid: Option<String>,
}

impl EnrollmentTokenSearch {
    fn apply(&self, request: ApiRequest) -> ApiRequest {
        request
            .query_opt("username", self.username.as_deref())
            .query_opt("userid", self.userid.as_deref())
            .query_opt("organizationgroupid", self.organizationgroupid.as_deref())
            .query_opt("organizationgroup", self.organizationgroup.as_deref())
            .query_opt("serialnumber", self.serialnumber.as_deref())
            .query_opt("assetnumber", self.assetnumber.as_deref())
            .query_opt("enrollmentstatusid", self.enrollmentstatusid.as_deref())
            .query_opt("compliancestatusid", self.compliancestatusid.as_deref())
    }
}

/// Optional filters for [`get_enrolled_devices`].
#[derive(Debug, Clone, Default)]
pub struct EnrolledDeviceSearch {
    /// Organization group id.
    pub organizationgroupid: Option<String>,
    /// Organization group name.
    pub organizationgroup: Option<String>,
    /// Platform name.
    pub platform: Option<String>,
    /// Custom attribute filter.
    pub customattributes: Option<String>,
    /// Device serial number.
    pub serialnumber: Option<String>,
    /// Last seen on or after.
    pub seensince: Option<String>,
    /// Last seen on or before.
    pub seentill: Option<String>,
    /// Enrolled on or after.
    pub enrolledsince: Option<String>,
    /// Enrolled on or before.
    pub enrolledtill: Option<String>,
}

impl EnrolledDeviceSearch {
    fn apply(&self, request: ApiRequest) -> ApiRequest {
        request
            .query_opt("organizationgroupid", self.organizationgroupid.as_deref())
            .query_opt("organizationgroup", self.organizationgroup.as_deref())
            .query_opt("platform", self.platform.as_deref())
            .query_opt("customattributes", self.customattributes.as_deref())
            .query_opt("serialnumber", self.serialnumber.as_deref())
            .query_opt("seensince", self.seensince.as_deref())
            .query_opt("seentill", self.seentill.as_deref())
            .query_opt("enrolledsince", self.enrolledsince.as_deref())
            .query_opt("enrolledtill", self.enrolledtill.as_deref())
    }
}

/// Searches enrollment users by user name.
pub fn search_enrollment_user(client: &UemClient, username: &str) -> crate::error::Result<Value> {
    client.send(ApiRequest::get("system/users/search").query("username", username))
}

/// Creates an enrollment user.
pub fn create_enrollment_user(
    client: &UemClient,
    request: &CreateEnrollmentUserRequest,
) -> crate::error::Result<Value> {
    client.post("system/users/adduser", request)
}

/// Retrieves an enrollment user by uuid.
pub fn get_enrollment_user(client: &UemClient, user_uuid: &str) -> crate::error::Result<Value> {
    client.send(ApiRequest::get("system/users").segment(user_uuid))
}

/// Pre-registers a device for an enrollment user.
pub fn register_device_to_enrollment_user(
    client: &UemClient,
    user_id: &str,
    request: &RegisterDeviceRequest,
) -> crate::error::Result<Value> {
    let request = ApiRequest::post("system/users")
        .segment(user_id)
        .segment("registerdevice")
        .json(request)?;
    client.send(request)
}

/// Searches enrollment tokens.
pub fn search_enrollment_tokens(
    client: &UemClient,
    search: &EnrollmentTokenSearch,
) -> crate::error::Result<Value> {
    client.send(search.apply(ApiRequest::get("system/users/enrollmenttoken/search")))
}

/// Searches devices enrolled by enrollment users.
pub fn get_enrolled_devices(
    client: &UemClient,
    search: &EnrolledDeviceSearch,
) -> crate::error::Result<Value> {
    client.send(search.apply(ApiRequest::get("system/users/enrolleddevices/search")))
}

// ── Organization groups ────────────────────────────────────────────────

/// Parameters for [`create_organization_group`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateOrganizationGroupRequest {
    /// Display name.
    pub name: String,
    /// Group id used at enrollment.
    pub group_id: String,
    /// Country name.
    pub country: String,
    /// Locale, e.g. `en-US`.
    pub locale: String,
    /// Whether a default location is created.
    pub add_default_location: String,
    /// Whether REST API access is enabled for the new group.
    pub enable_rest_api_access: bool,
}

#[derive(Serialize)]
struct NewOrganizationGroup<'a> {
    #[serde(flatten)]
    request: &'a CreateOrganizationGroupRequest,
    #[serde(rename = "LocationGroupType")]
    location_group_type: &'static str,
}

/// Body for [`enable_dropship_provisioning_v1`].
#[derive(Debug, Clone, Serialize)]
pub struct DropshipProvisioning {
    /// Dropship provisioning account.
    pub username: String,
    /// Dropship provisioning password.
    pub password: String,
    /// Organization group the setting applies to.
    pub organization_group_uuid: String,
    /// Child organization groups that inherit the setting.
    pub sub_organization_groups: Vec<Value>,
    /// `false` turns dropship provisioning off.
    pub enable_dropship_provisioning: bool,
}

/// Retrieves an organization group.
pub fn get_organization_group(client: &UemClient, og_id: &str) -> crate::error::Result<Value> {
    client.send(ApiRequest::get("system/groups").segment(og_id))
}

/// Lists every organization group below `og_id`.
pub fn list_child_organization_groups(
    client: &UemClient,
    og_id: &str,
) -> crate::error::Result<Value> {
    client.send(ApiRequest::get("system/groups").segment(og_id).segment("children"))
}

/// Creates a `Container` organization group below `parent_og_id`.
pub fn create_organization_group(
    client: &UemClient,
    parent_og_id: &str,
    request: &CreateOrganizationGroupRequest,
) -> crate::error::Result<Value> {
    let body = NewOrganizationGroup {
        request,
        location_group_type: "Container",
    };
    client.send(ApiRequest::post("system/groups").segment(parent_og_id).json(&body)?)
}

/// Reads the enrollment customization settings of an organization group.
pub fn get_enrollment_customization_settings(
    client: &UemClient,
    og_uuid: &str,
) -> crate::error::Result<Value> {
    let request = ApiRequest::get("system/groups")
        .segment(og_uuid)
        .path_suffix("settings/enrollment/customization")
        .versioned();
    client.send(request)
}

/// Reads the dropship provisioning settings of an organization group.
pub fn get_dropship_provisioning(client: &UemClient, og_uuid: &str) -> crate::error::Result<Value> {
    let request = ApiRequest::get("system/groups")
        .segment(og_uuid)
        .segment("dropship-provisioning")
        .versioned();
    client.send(request)
}

/// Turns dropship provisioning on or off. Sent as `PATCH`, so a transient
/// server error is not retried.
pub fn enable_dropship_provisioning_v1(
    client: &UemClient,
    og_uuid: &str,
    settings: &DropshipProvisioning,
) -> crate::error::Result<Value> {
    let request = ApiRequest::patch("system/groups")
        .segment(og_uuid)
        .segment("dropship-provisioning")
        .versioned()
        .json(settings)?;
    client.send(request)
}

// ── Admins ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct AdminIdentity<'a> {
    username: &'a str,
    password: &'a str,
    tenant_uuid: &'a str,
}

/// Optional filters for [`search_admins`]. Unset fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct AdminSearch {
    /// First name filter.
    pub firstname: Option<String>,
    /// Last name filter.
    pub lastname: Option<String>,
    /// Email filter.
    pub email: Option<String>,
    /// Organization group id filter.
    pub organizationgroupid: Option<String>,
    /// Role filter.
    pub role: Option<String>,
    /// User name filter.
    pub username: Option<String>,
    /// Sort field.
    pub orderby: Option<String>,
    /// Zero-based page.
    pub page: Option<u32>,
    /// Page size.
    pub pagesize: Option<u32>,
    /// `ASC` or `DESC`.
    pub sortorder: Option<String>,
    /// Account status filter.
    pub status: Option<String>,
}

impl AdminSearch {
    fn apply(&self, request: ApiRequest) -> ApiRequest {
        request
            .query_opt("firstname", self.firstname.as_deref())
            .query_opt("lastname", self.lastname.as_deref())
            .query_opt("email", self.email.as_deref())
            .query_opt("organizationgroupid", self.organizationgroupid.as_deref())
            .query_opt("role", self.role.as_deref())
            .query_opt("username", self.username.as_deref())
            .query_opt("orderby", self.orderby.as_deref())
            .query_opt("page", self.page)
            .query_opt("pagesize", self.pagesize)
            .query_opt("sortorder", self.sortorder.as_deref())
            .query_opt("status", self.status.as_deref())
    }
}

/// `{"Value": n}` wrapper used for numeric ids in admin bodies.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct IdValue {
    /// Numeric id.
    #[serde(rename = "Value")]
    pub value: i64,
}

/// Body for [`create_admin_user`] and [`update_admin_user`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdminUser {
    /// Login name.
    pub user_name: String,
    /// Initial or replacement password.
    pub password: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Organization group name.
    pub location_group: String,
    /// Organization group id.
    pub location_group_id: String,
    /// Organization group uuid.
    pub organization_group_uuid: String,
    /// Time zone display name.
    pub time_zone: String,
    /// IANA or Windows time zone identifier.
    pub time_zone_identifier: String,
    /// Locale, e.g. `en-US`.
    pub locale: String,
    /// Console page shown after login.
    pub initial_landing_page: String,
    /// Last login timestamp as reported by the console.
    #[serde(rename = "LastLoginTimeStamp")]
    pub last_login_timestamp: String,
    /// Role assignments, e.g. `[{"Id": 1, "LocationGroupId": 570}]`.
    pub roles: Vec<Value>,
    /// Whether the admin is backed by a directory account.
    pub is_active_directory_user: bool,
    /// Whether the password must be changed at next login.
    pub requires_password_change: bool,
    /// Welcome message type.
    pub message_type: i64,
    /// Welcome message template id.
    pub message_template_id: i64,
    /// External (directory) id.
    pub external_id: String,
    /// Numeric admin id.
    pub id: IdValue,
    /// Admin uuid.
    pub uuid: String,
}

/// Body for [`change_admin_password`]: the account fields the console
/// echoes back alongside the new password.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdminPasswordChange {
    /// New password.
    pub password: String,
    /// Organization group uuid.
    pub organization_group_uuid: String,
    /// IANA or Windows time zone identifier.
    pub time_zone_identifier: String,
    /// Last login timestamp as reported by the console.
    #[serde(rename = "LastLoginTimeStamp")]
    pub last_login_timestamp: String,
    /// Whether the admin is backed by a directory account.
    pub is_active_directory_user: bool,
    /// Whether the password must be changed at next login.
    pub requires_password_change: bool,
    /// Notification message type.
    pub message_type: i64,
    /// Notification message template id.
    pub message_template_id: i64,
    /// External (directory) id.
    pub external_id: String,
    /// Numeric admin id.
    pub id: IdValue,
    /// Admin uuid.
    pub uuid: String,
}

/// Body for [`add_role_to_admin`] and [`remove_role_from_admin`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdminRole {
    /// Role id.
    pub id: i64,
    /// Role uuid.
    pub uuid: String,
    /// Organization group name the role applies to.
    pub location_group: String,
    /// Organization group id the role applies to.
    pub location_group_id: String,
    /// Organization group uuid the role applies to.
    pub organization_group_uuid: String,
    /// Whether the role assignment is active.
    pub is_active: bool,
    /// User link id.
    pub user_link_id: i64,
}

fn admin(method: Method, admin_id: &str, action: &str) -> ApiRequest {
    ApiRequest::new(method, "system/admins").segment(admin_id).segment(action)
}

/// Exchanges admin credentials for an identity record on the tenant.
pub fn get_admin_identity(
    client: &UemClient,
    username: &str,
    password: &str,
    tenant_uuid: &str,
) -> crate::error::Result<Value> {
    let body = AdminIdentity {
        username,
        password,
        tenant_uuid,
    };
    client.post("system/idp/admin", &body)
}

/// Searches admin accounts.
pub fn search_admins(client: &UemClient, search: &AdminSearch) -> crate::error::Result<Value> {
    client.send(search.apply(ApiRequest::get("system/admins/search")))
}

/// Retrieves an admin account.
pub fn get_admin(client: &UemClient, admin_id: &str) -> crate::error::Result<Value> {
    client.send(ApiRequest::get("system/admins").segment(admin_id))
}

/// Deletes an admin account.
pub fn delete_admin(client: &UemClient, admin_id: &str) -> crate::error::Result<Value> {
    client.send(admin(Method::DELETE, admin_id, "delete"))
}

/// Creates an admin account.
pub fn create_admin_user(client: &UemClient, admin: &AdminUser) -> crate::error::Result<Value> {
    client.post("system/admins/addadminuser", admin)
}

/// Updates an admin account. The endpoint takes `POST`, not `PUT`.
pub fn update_admin_user(
    client: &UemClient,
    admin_id: &str,
    user: &AdminUser,
) -> crate::error::Result<Value> {
    client.send(admin(Method::POST, admin_id, "update").json(user)?)
}

/// Sets a new password on an admin account.
pub fn change_admin_password(
    client: &UemClient,
    admin_id: &str,
    change: &AdminPasswordChange,
) -> crate::error::Result<Value> {
    client.send(admin(Method::POST, admin_id, "changepassword").json(change)?)
}

/// Grants a role to an admin.
pub fn add_role_to_admin(
    client: &UemClient,
    admin_id: &str,
    role: &AdminRole,
) -> crate::error::Result<Value> {
    client.send(admin(Method::POST, admin_id, "addrole").json(role)?)
}

/// Revokes a role from an admin.
pub fn remove_role_from_admin(
    client: &UemClient,
    admin_id: &str,
    role: &AdminRole,
) -> crate::error::Result<Value> {
    client.send(admin(Method::POST, admin_id, "removerole").json(role)?)
}

/// Reads whether the configurations "About" page is shown to an admin.
pub fn get_admin_about_page_config(
    client: &UemClient,
    admin_id: &str,
) -> crate::error::Result<Value> {
    client.send(admin(Method::GET, admin_id, "configurationsaboutpage"))
}

/// Shows or hides the configurations "About" page for an admin. The flag
/// travels as a `true`/`false` path segment.
pub fn update_admin_about_page_config(
    client: &UemClient,
    admin_id: &str,
    show_page: bool,
) -> crate::error::Result<Value> {
    client.send(admin(Method::POST, admin_id, "configurationsaboutpage").segment(show_page))
}

// ── Event notifications ────────────────────────────────────────────────

const EVENT_NOTIFICATIONS_LEGACY: &str = "system/eventnotifications";
const EVENT_NOTIFICATIONS_V1: &str = "system/eventnotifications/V1/eventnotifications";

/// Event notification (webhook) rule. Both create routes take this body.
#[derive(Debug, Clone, Serialize)]
pub struct EventNotificationRule {
    /// Rule name.
    #[serde(rename = "TargetName")]
    pub target_name: String,
    /// Receiver URL.
    #[serde(rename = "TargetUrl")]
    pub target_url: String,
    /// Basic auth user for the receiver.
    #[serde(rename = "Username")]
    pub username: String,
    /// Basic auth password for the receiver.
    #[serde(rename = "Password")]
    pub password: String,
    /// Payload format id (`0` XML, `1` JSON).
    #[serde(rename = "Format")]
    pub format: i64,
    /// Whether the rule fires.
    #[serde(rename = "IsActive")]
    pub is_active: bool,
    /// Map of event name to enabled flag.
    #[serde(rename = "DeviceEvents")]
    pub device_events: Value,
    /// Owning organization group id.
    #[serde(rename = "organizationGroupId")]
    pub organization_group_id: i64,
    /// Owning organization group uuid.
    #[serde(rename = "organizationGroupUuid")]
    pub organization_group_uuid: String,
    /// Record id (`0` for new rules).
    pub id: i64,
    /// Record uuid.
    pub uuid: String,
}

/// Optional filters for [`search_event_notifications`].
#[derive(Debug, Clone, Default)]
pub struct EventNotificationSearch {
    /// Rule name filter.
    pub targetname: Option<String>,
    /// Organization group id filter.
    pub organizationgroupid: Option<String>,
    /// Active/inactive filter.
    pub status: Option<String>,
    /// Sort field.
    pub orderby: Option<String>,
    /// `ASC` or `DESC`.
    pub sortorder: Option<String>,
    /// Zero-based page.
    pub page: Option<u32>,
    /// Page size.
    pub pagesize: Option<u32>,
}

/// Creates a rule through the legacy route.
pub fn create_event_notification_rule_legacy(
    client: &UemClient,
    rule: &EventNotificationRule,
) -> crate::error::Result<Value> {
    client.post(EVENT_NOTIFICATIONS_LEGACY, rule)
}

/// Creates a rule through the `V1` route.
pub fn create_event_notification_rule_v1(
    client: &UemClient,
    rule: &EventNotificationRule,
) -> crate::error::Result<Value> {
    client.post(EVENT_NOTIFICATIONS_V1, rule)
}

/// Retrieves a rule through the legacy route.
pub fn get_event_notification_rule_legacy(
    client: &UemClient,
    notification_id: &str,
) -> crate::error::Result<Value> {
    client.send(ApiRequest::get(EVENT_NOTIFICATIONS_LEGACY).segment(notification_id))
}

/// Retrieves a rule through the `V1` route.
pub fn get_event_notification_rule(
    client: &UemClient,
    notification_id: &str,
) -> crate::error::Result<Value> {
    client.send(ApiRequest::get(EVENT_NOTIFICATIONS_V1).segment(notification_id))
}

/// Replaces a rule; `rule` is sent as-is.
pub fn update_event_notification_rule(
    client: &UemClient,
    notification_id: &str,
    rule: &Value,
) -> crate::error::Result<Value> {
    client.send(ApiRequest::put(EVENT_NOTIFICATIONS_V1).segment(notification_id).json(rule)?)
}

/// Deletes a rule.
pub fn delete_event_notification_rule(
    client: &UemClient,
    notification_id: &str,
) -> crate::error::Result<Value> {
    client.send(ApiRequest::delete(EVENT_NOTIFICATIONS_V1).segment(notification_id))
}

/// Searches rules.
pub fn search_event_notifications(
    client: &UemClient,
    search: &EventNotificationSearch,
) -> crate::error::Result<Value> {
    let request = ApiRequest::get(EVENT_NOTIFICATIONS_V1)
        .segment("search")
        .query_opt("targetname", search.targetname.as_deref())
        .query_opt("organizationgroupid", search.organizationgroupid.as_deref())
        .query_opt("status", search.status.as_deref())
        .query_opt("orderby", search.orderby.as_deref())
        .query_opt("sortorder", search.sortorder.as_deref())
        .query_opt("page", search.page)
        .query_opt("pagesize", search.pagesize);
    client.send(request)
}

// ── Device wipes ───────────────────────────────────────────────────────

/// Optional filters for [`get_device_wipe_events`].
#[derive(Debug, Clone, Default)]
pub struct DeviceWipeSearch {
    /// Free-text filter.
    pub search_text: Option<String>,
    /// ISO 8601 lower bound.
    pub start_date: Option<String>,
    /// ISO 8601 upper bound.
    pub end_date: Option<String>,
    /// Wipe type filter.
    pub wipe_type: Option<String>,
    /// Wipe source filter.
    pub wipe_source: Option<String>,
    /// Wipe status filter.
    pub wipe_status: Option<String>,
    /// Ownership filter.
    pub ownership: Option<String>,
    /// Zero-based page.
    pub page: Option<u32>,
    /// Page size.
    pub page_size: Option<u32>,
    /// Sort column, e.g. `DATE`.
    pub sort_column: Option<String>,
    /// `ASC` or `DESC`.
    pub sort_direction: Option<String>,
}

/// Body for [`create_device_wipe_report`]. Unset fields are left out of the
/// body rather than sent as `null`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceWipeReport {
    /// Free-text filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    /// ISO 8601 lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// ISO 8601 upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Wipe type filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wipe_type: Option<String>,
    /// Wipe status filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wipe_status: Option<String>,
    /// Wipe source filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wipe_source: Option<String>,
    /// Ownership types, e.g. `["ANY"]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ownership: Option<Vec<String>>,
    /// Sort column, e.g. `DATE`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_column: Option<String>,
    /// `ASC` or `DESC`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<String>,
    /// Export format, e.g. `XLSX`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_format: Option<String>,
}

/// Decision applied by [`perform_device_wipe_action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WipeAction {
    /// Let the pending wipes proceed.
    Approve,
    /// Cancel the pending wipes.
    Reject,
}

impl WipeAction {
    /// Query value expected by the API.
    pub fn as_str(self) -> &'static str {
        match self {
            WipeAction::Approve => "APPROVE",
            WipeAction::Reject => "REJECT",
        }
    }
}

fn device_wipes(method: Method, og_uuid: &str, resource: &str) -> ApiRequest {
    ApiRequest::new(method, "system/groups")
        .segment(og_uuid)
        .path_suffix(resource)
        .versioned()
}

/// Lists device wipe log entries of an organization group.
pub fn get_device_wipe_events(
    client: &UemClient,
    og_uuid: &str,
    search: &DeviceWipeSearch,
) -> crate::error::Result<Value> {
    let request = device_wipes(Method::GET, og_uuid, "device-wipes")
        .query_opt("search_text", search.search_text.as_deref())
        .query_opt("start_date", search.start_date.as_deref())
        .query_opt("end_date", search.end_date.as_deref())
        .query_opt("wipe_type", search.wipe_type.as_deref())
        .query_opt("wipe_source", search.wipe_source.as_deref())
        .query_opt("wipe_status", search.wipe_status.as_deref())
        .query_opt("ownership", search.ownership.as_deref())
        .query_opt("page", search.page)
        .query_opt("page_size", search.page_size)
        .query_opt("sort_column", search.sort_column.as_deref())
        .query_opt("sort_direction", search.sort_direction.as_deref());
    client.send(request)
}

/// Approves or rejects pending wipes. The body is a bare JSON array of
/// wipe uuids.
pub fn perform_device_wipe_action(
    client: &UemClient,
    og_uuid: &str,
    action: WipeAction,
    wipe_uuids: &[String],
) -> crate::error::Result<Value> {
    let request = device_wipes(Method::POST, og_uuid, "device-wipes")
        .query("action", action.as_str())
        .json(wipe_uuids)?;
    client.send(request)
}

/// Queues an export of the device wipe log.
pub fn create_device_wipe_report(
    client: &UemClient,
    og_uuid: &str,
    report: &DeviceWipeReport,
) -> crate::error::Result<Value> {
    let request = device_wipes(Method::POST, og_uuid, "device-wipes/reports");
    client.send(request.json(report)?)
}

/// Reads the wipe lock state of an organization group.
pub fn get_device_wipe_lock_state(
    client: &UemClient,
    og_uuid: &str,
) -> crate::error::Result<Value> {
    client.send(device_wipes(Method::GET, og_uuid, "device-wipe-lock"))
}

/// Resets the wipe lock so held wipes can proceed. Usually answers 204.
pub fn reset_device_wipe_lock(client: &UemClient, og_uuid: &str) -> crate::error::Result<Value> {
    client.send(device_wipes(Method::PUT, og_uuid, "device-wipe-lock"))
}

// ── Custom attributes ──────────────────────────────────────────────────

/// Optional filters for [`search_custom_attributes`].
#[derive(Debug, Clone, Default)]
pub struct CustomAttributeSearch {
    /// Organization group id filter.
    pub organizationgroupid: Option<String>,
    /// Attribute name filter.
    pub name: Option<String>,
    /// Zero-based page.
    pub page: Option<u32>,
    /// Page size.
    pub pagesize: Option<u32>,
}

/// Body for [`create_custom_attribute`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomAttributeDefinition {
    /// Application group the attribute belongs to.
    pub application_group: String,
    /// Whether values are collected for the rule creator.
    pub collect_values_for_rule_creator: bool,
    /// Free-text description.
    pub description: String,
    /// Owning organization group id.
    #[serde(rename = "ManagedByOrganizationGroupID")]
    pub managed_by_organization_group_id: String,
    /// Attribute name.
    pub name: String,
    /// Whether values survive re-enrollment.
    pub persist: bool,
    /// Whether the attribute is offered in the rule creator.
    pub show_in_rule_creator: bool,
    /// Whether the attribute serves as a lookup value.
    pub use_as_lookup_value: bool,
    /// Predefined values, e.g. `[{"uuid": "..."}]`.
    pub values: Vec<Value>,
    /// Definition uuid.
    #[serde(rename = "uuid")]
    pub uuid: String,
}

#[derive(Serialize)]
struct CustomAttributeUpdate<'a, A: Serialize> {
    #[serde(rename = "CustomAttributes")]
    custom_attributes: A,
    uuid: &'a str,
}

#[derive(Serialize)]
struct AttributeRef<'a> {
    uuid: &'a str,
}

fn attribute_refs(uuids: &[String]) -> Vec<AttributeRef<'_>> {
    uuids.iter().map(|uuid| AttributeRef { uuid }).collect()
}

/// `system/users/registereddevices/{kind}/{id}/{action}`, versioned.
fn registered_device_attributes(kind: &str, id: &str, action: &str) -> ApiRequest {
    ApiRequest::post("system/users/registereddevices")
        .segment(kind)
        .segment(id)
        .segment(action)
        .versioned()
}

/// Searches custom attribute definitions.
pub fn search_custom_attributes(
    client: &UemClient,
    search: &CustomAttributeSearch,
) -> crate::error::Result<Value> {
    let request = ApiRequest::get("system/customattributes/search")
        .query_opt("organizationgroupid", search.organizationgroupid.as_deref())
        .query_opt("name", search.name.as_deref())
        .query_opt("page", search.page)
        .query_opt("pagesize", search.pagesize);
    client.send(request)
}

/// Creates a custom attribute definition.
pub fn create_custom_attribute(
    client: &UemClient,
    definition: &CustomAttributeDefinition,
) -> crate::error::Result<Value> {
    client.post("system/customattributes/create", definition)
}

/// Adds custom attribute values to the registered device with
/// `serial_number`.
pub fn create_enrollment_custom_attributes(
    client: &UemClient,
    serial_number: &str,
    custom_attributes: &[Value],
    uuid: &str,
) -> crate::error::Result<Value> {
    let body = CustomAttributeUpdate {
        custom_attributes,
        uuid,
    };
    let request =
        registered_device_attributes("serialnumber", serial_number, "createcustomattributes");
    client.send(request.json(&body)?)
}

/// Sets custom attribute values on the registered device with
/// `serial_number`.
pub fn update_custom_attributes_by_serial(
    client: &UemClient,
    serial_number: &str,
    custom_attributes: &[Value],
    uuid: &str,
) -> crate::error::Result<Value> {
    let body = CustomAttributeUpdate {
        custom_attributes,
        uuid,
    };
    let request =
        registered_device_attributes("serialnumber", serial_number, "updatecustomattributes");
    client.send(request.json(&body)?)
}

/// Removes custom attribute values, named by attribute uuid, from the
/// registered device with `serial_number`.
pub fn delete_custom_attributes_by_serial(
    client: &UemClient,
    serial_number: &str,
    custom_attribute_uuids: &[String],
    request_uuid: &str,
) -> crate::error::Result<Value> {
    let body = CustomAttributeUpdate {
        custom_attributes: attribute_refs(custom_attribute_uuids),
        uuid: request_uuid,
    };
    let request =
        registered_device_attributes("serialnumber", serial_number, "deletecustomattributes");
    client.send(request.json(&body)?)
}

/// Assigns custom attributes, named by uuid, to the registered device with
/// `asset_number`.
pub fn create_custom_attributes_for_registered_device(
    client: &UemClient,
    asset_number: &str,
    custom_attribute_uuids: &[String],
    device_uuid: &str,
) -> crate::error::Result<Value> {
    let body = CustomAttributeUpdate {
        custom_attributes: attribute_refs(custom_attribute_uuids),
        uuid: device_uuid,
    };
    let request =
        registered_device_attributes("assetnumber", asset_number, "updatecustomattributes");
    client.send(request.json(&body)?)
}

/// Removes custom attributes from the registered device with `asset_number`.
pub fn delete_custom_attributes_for_registered_device(
    client: &UemClient,
    asset_number: &str,
    custom_attributes: &[Value],
    uuid: &str,
) -> crate::error::Result<Value> {
    let body = CustomAttributeUpdate {
        custom_attributes,
        uuid,
    };
    let request =
        registered_device_attributes("assetnumber", asset_number, "deletecustomattributes");
    client.send(request.json(&body)?)
}

// ── Registered devices ─────────────────────────────────────────────────

/// Optional filters for [`get_registered_devices`].
#[derive(Debug, Clone, Default)]
pub struct RegisteredDeviceSearch {
    /// Organization group id.
    pub organizationgroupid: Option<String>,
    /// Organization group name.
    pub organizationgroup: Option<String>,
    /// Platform name.
    pub platform: Option<String>,
    /// Custom attribute filter.
    pub customattributes: Option<String>,
    /// Device asset number.
    pub assetnumber: Option<String>,
    /// Last seen on or after.
    pub seensince: Option<String>,
    /// Last seen on or before.
    pub seentill: Option<String>,
}

impl RegisteredDeviceSearch {
    fn apply(&self, request: ApiRequest) -> ApiRequest {
        request
            .query_opt("organizationgroupid", self.organizationgroupid.as_deref())
            .query_opt("organizationgroup", self.organizationgroup.as_deref())
            .query_opt("platform", self.platform.as_deref())
            .query_opt("customattributes", self.customattributes.as_deref())
            .query_opt("assetnumber", self.assetnumber.as_deref())
            .query_opt("seensince", self.seensince.as_deref())
            .query_opt("seentill", self.seentill.as_deref())
    }
}

/// Searches pre-registered devices.
pub fn get_registered_devices(
    client: &UemClient,
    search: &RegisteredDeviceSearch,
) -> crate::error::Result<Value> {
    client.send(search.apply(ApiRequest::get("system/users/registereddevices/search")))
}

/// Deletes registered devices in bulk. `search_by` names the identifier
/// kind in `identifiers` (`Serialnumber`, `AssetNumber`, `Udid`, ...).
pub fn delete_registered_devices(
    client: &UemClient,
    search_by: &str,
    identifiers: &[String],
) -> crate::error::Result<Value> {
    let request = ApiRequest::post("system/users/registereddevices/delete")
        .query("searchby", search_by)
        .json(&BulkValues::new(identifiers))?;
    client.send(request)
}

/// Deletes registered devices by serial number.
pub fn delete_registered_devices_by_serial_number(
    client: &UemClient,
    serial_numbers: &[String],
) -> crate::error::Result<Value> {
    client.post(
        "system/users/registereddevices/deletebyserialnumber",
        &BulkValues::new(serial_numbers),
    )
}

/// Deletes registered devices by UDID.
pub fn delete_registered_devices_by_udid(
    client: &UemClient,
    udids: &[String],
) -> crate::error::Result<Value> {
    client.post("system/users/registereddevices/deletebyudid", &BulkValues::new(udids))
}

/// Deletes registered devices by asset number.
pub fn delete_registered_devices_by_asset_number(
    client: &UemClient,
    asset_numbers: &[String],
) -> crate::error::Result<Value> {
    client.post(
        "system/users/registereddevices/deletebyassetnumber",
        &BulkValues::new(asset_numbers),
    )
}

// ── LDAP sync ──────────────────────────────────────────────────────────

/// Body for [`create_advanced_ldap_sync_job`].
#[derive(Debug, Clone, Serialize)]
pub struct LdapSyncJobRequest {
    /// Organization group the sync runs in.
    pub organization_group_uuid: String,
    /// Refresh mode.
    pub refresh: String,
    /// Match users on their external id instead of the user name.
    pub use_external_id: bool,
    /// Restrict the sync to these enrollment users.
    pub enrollment_user_uuids: Vec<String>,
}

/// Paging and sorting for [`get_advanced_ldap_sync_jobs`] and
/// [`get_advanced_ldap_sync_job_details`].
#[derive(Debug, Clone, Default)]
pub struct LdapSyncPage {
    /// Page number.
    pub page_number: Option<u32>,
    /// Page size, at most 500.
    pub page_size: Option<u32>,
    /// Free-text filter.
    pub search_text: Option<String>,
    /// Sort column, e.g. `JOB_ID`.
    pub sort_column: Option<String>,
    /// `ASC` or `DESC`.
    pub sort_order: Option<String>,
}

impl LdapSyncPage {
    fn apply(&self, request: ApiRequest) -> ApiRequest {
        request
            .query_opt("page_number", self.page_number)
            .query_opt("page_size", self.page_size)
            .query_opt("search_text", self.search_text.as_deref())
            .query_opt("sort_column", self.sort_column.as_deref())
            .query_opt("sort_order", self.sort_order.as_deref())
    }
}

/// Decision applied by [`approve_or_decline_ldap_sync_job`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LdapSyncDecision {
    /// Apply the staged changes.
    Approve,
    /// Discard the staged changes.
    Decline,
}

impl LdapSyncDecision {
    /// Query value expected by the API.
    pub fn as_str(self) -> &'static str {
        match self {
            LdapSyncDecision::Approve => "approve",
            LdapSyncDecision::Decline => "decline",
        }
    }
}

#[derive(Serialize)]
struct LdapSyncApproval<'a> {
    approval_type: &'a str,
    enrollment_user_uuids: &'a [String],
}

/// Lists advanced LDAP sync jobs of an organization group. `status_filter`
/// takes a job status code (1 to 10).
pub fn get_advanced_ldap_sync_jobs(
    client: &UemClient,
    og_uuid: &str,
    status_filter: Option<u32>,
    page: &LdapSyncPage,
) -> crate::error::Result<Value> {
    let request = ApiRequest::get("system/advanced-ldap-sync-jobs")
        .query("organization_group_uuid", og_uuid)
        .query_opt("status_filter", status_filter);
    client.send(page.apply(request))
}

/// Starts an advanced LDAP sync job.
pub fn create_advanced_ldap_sync_job(
    client: &UemClient,
    request: &LdapSyncJobRequest,
) -> crate::error::Result<Value> {
    client.post("system/advanced-ldap-sync-jobs", request)
}

/// Lists the per-user results of an advanced LDAP sync job.
pub fn get_advanced_ldap_sync_job_details(
    client: &UemClient,
    job_uuid: &str,
    page: &LdapSyncPage,
) -> crate::error::Result<Value> {
    client.send(page.apply(ApiRequest::get("system/advanced-ldap-sync-jobs").segment(job_uuid)))
}

/// Approves or declines the staged changes of a sync job for
/// `enrollment_user_uuids`. `approval_type` is e.g. `ALL`.
pub fn approve_or_decline_ldap_sync_job(
    client: &UemClient,
    job_uuid: &str,
    decision: LdapSyncDecision,
    approval_type: &str,
    enrollment_user_uuids: &[String],
) -> crate::error::Result<Value> {
    let body = LdapSyncApproval {
        approval_type,
        enrollment_user_uuids,
    };
    let request = ApiRequest::post("system/advanced-ldap-sync-jobs")
        .segment(job_uuid)
        .query("action", decision.as_str())
        .json(&body)?;
    client.send(request)
}

/// Reads the status of an advanced LDAP sync job.
pub fn get_ldap_sync_job_status(client: &UemClient, job_uuid: &str) -> crate::error::Result<Value> {
    let request = ApiRequest::get("system/advanced-ldap-sync-jobs/status").segment(job_uuid);
    client.send(request)
}
