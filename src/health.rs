//! Paged collection of the product device health check report.
//!
//! The report endpoint ([`crate::mdm::get_device_health_check`]) is paged
//! and only reveals the device count (`Total`) in its responses. Collection
//! therefore runs in two phases: a one-device request to read `Total`, then
//! a page walk driven by [`DeviceHealthReportTracker`].

use serde_json::Value;

use crate::client::UemClient;
use crate::mdm;

/// Default page size for the health report walk.
pub const DEFAULT_PAGE_SIZE: u32 = 5000;

/// Pagination state for one device health report walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHealthReportTracker {
    organization_group_id: String,
    page_size: u32,
    page: u32,
    max_pages: u32,
    make_next_call: bool,
}

impl DeviceHealthReportTracker {
    /// Starts at page 0. A `page_size` of 0 is treated as 1.
    pub fn new(organization_group_id: impl Into<String>, page_size: u32) -> Self {
        DeviceHealthReportTracker {
            organization_group_id: organization_group_id.into(),
            page_size: page_size.max(1),
            page: 0,
            max_pages: 0,
            make_next_call: true,
        }
    }

    /// Sets the page count from the device total: `ceil(total / page_size)`.
    pub fn set_max_pages(&mut self, total_devices: u64) {
        let pages = total_devices.div_ceil(u64::from(self.page_size));
        self.max_pages = u32::try_from(pages).unwrap_or(u32::MAX);
    }

    /// Moves to the next page while `page < max_pages`; otherwise marks the
    /// walk finished.
    pub fn advance(&mut self) {
        if self.page < self.max_pages {
            self.page += 1;
            self.make_next_call = true;
        } else {
            self.make_next_call = false;
        }
    }

    /// Organization group being reported on.
    pub fn organization_group_id(&self) -> &str {
        &self.organization_group_id
    }

    /// Devices requested per page.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Current zero-based page.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Page count derived from the first one-device read.
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Whether another page should be fetched.
    pub fn make_next_call(&self) -> bool {
        self.make_next_call
    }
}

/// Collects every device entry of the health report for an organization
/// group.
///
/// Pages are appended in order. A page without a `Devices` array
/// contributes nothing.
///
/// # Errors
///
/// The first failing call aborts the walk and its error is returned;
/// devices gathered so far are discarded.
pub fn collect_device_health(
    client: &UemClient,
    organization_group_id: &str,
    page_size: u32,
) -> crate::error::Result<Vec<Value>> {
    let mut tracker = DeviceHealthReportTracker::new(organization_group_id, page_size);

    let first = mdm::get_device_health_check(client, tracker.organization_group_id(), 1, 0)?;
    let total = first.get("Total").and_then(Value::as_u64).unwrap_or(0);
    tracker.set_max_pages(total);
    tracing::info!(
        organization_group_id,
        total,
        max_pages = tracker.max_pages(),
        "collecting device health report"
    );

    let mut devices = Vec::new();
    while tracker.make_next_call() {
        let page = mdm::get_device_health_check(
            client,
            tracker.organization_group_id(),
            tracker.page_size(),
            tracker.page(),
        )?;
        if let Some(Value::Array(entries)) = page.get("Devices") {
            devices.extend(entries.iter().cloned());
        }
        tracing::debug!(
            page = tracker.page(),
            collected = devices.len(),
            "health report page read"
        );
        tracker.advance();
    }

    Ok(devices)
}
