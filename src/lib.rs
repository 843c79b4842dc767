//! Blocking Rust client library for the VMware Workspace ONE UEM (AirWatch) REST API.
//!
//! Provides certificate-based `CMSURL` request signing, an authenticated HTTP
//! dispatcher with transport-level retry, and thin resource clients for the
//! MDM, MAM and System endpoint families.
//!
//! # Modules
//!
//! - [`auth`] — `CMSURL` header construction (detached CMS signature over the URL path).
//! - [`certificate`] — PKCS#12 bundle loading from a file or from memory.
//! - [`client`] — Authenticated request dispatcher with retry and timeouts.
//! - [`environment`] — Validated tenant settings (REST root, tenant code, parent OG).
//! - [`error`] — Typed error hierarchy (`UemError`) for all library operations.
//! - [`health`] — Paged collection of the device health check report.
//! - [`mam`] — Internal application blobs, installs and assignments.
//! - [`mdm`] — Devices, smart groups, tags, products and profiles.
//! - [`system`] — Users, groups, admins, event notifications, wipes and more.
//!
//! # Quick Start
//!
//! ```ignore
//! use secrecy::SecretString;
//! use ws1_uem::auth::CmsUrlSigner;
//! use ws1_uem::client::UemClient;
//! use ws1_uem::environment::Environment;
//! use ws1_uem::mdm;
//!
//! let environment = Environment::new("https://as1506.awmdm.com/API", "tenant-code", Some("570"))?;
//! let signer = CmsUrlSigner::from_file("client.p12", SecretString::from("pw".to_string()))?;
//! let client = UemClient::new(environment, signer)?;
//! let device = mdm::retrieve_device_information(&client, "C02XK0ABJG5J")?;
//! ```

#![warn(missing_docs)]

pub mod auth;
pub mod certificate;
pub mod client;
pub mod environment;
pub mod error;
pub mod health;
pub mod mam;
pub mod mdm;
pub mod system;
