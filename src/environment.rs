//! Tenant environment settings shared by every resource call.
//!
//! An [`Environment`] is validated once at construction and is read-only
//! afterwards, so a single instance can be shared across threads.

use url::Url;

use crate::error::{Result, UemError};

/// Connection settings for one Workspace ONE UEM tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    api_url: String,
    tenant_code: String,
    parent_og: Option<String>,
}

impl Environment {
    /// Validates and stores the tenant settings.
    ///
    /// `api_url` is the REST root including the `/API` segment, e.g.
    /// `https://as1506.awmdm.com/API`. A trailing slash is removed so paths
    /// can be appended uniformly.
    ///
    /// # Errors
    ///
    /// `UemError::Config` when the URL or tenant code is empty, or when the
    /// URL is not an absolute `http`/`https` URL.
    pub fn new(api_url: &str, tenant_code: &str, parent_og: Option<&str>) -> Result<Self> {
        let api_url = api_url.trim();
        let tenant_code = tenant_code.trim();

        if api_url.is_empty() {
            return Err(UemError::config("API base URL must not be empty"));
        }
        if tenant_code.is_empty() {
            return Err(UemError::config("tenant code must not be empty"));
        }

        let parsed = Url::parse(api_url)
            .map_err(|err| UemError::config(format!("invalid API base URL {api_url:?}: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(UemError::config(format!(
                "API base URL {api_url:?} must be an absolute http(s) URL"
            )));
        }

        let parent_og = parent_og
            .map(str::trim)
            .filter(|og| !og.is_empty())
            .map(str::to_owned);

        tracing::info!(api_url, "UEM environment configured");

        Ok(Environment {
            api_url: api_url.trim_end_matches('/').to_string(),
            tenant_code: tenant_code.to_string(),
            parent_og,
        })
    }

    /// REST root without a trailing slash.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Value sent in the `aw-tenant-code` header.
    pub fn tenant_code(&self) -> &str {
        &self.tenant_code
    }

    /// Parent organization group id, when one was configured.
    pub fn parent_og(&self) -> Option<&str> {
        self.parent_og.as_deref()
    }

    /// Joins a resource path (with or without a leading slash) onto the
    /// REST root.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_settings() {
        let env = Environment::new("https://uem.example.com/API", "tenant-abc", Some("570"))
            .unwrap();
        assert_eq!(env.api_url(), "https://uem.example.com/API");
        assert_eq!(env.tenant_code(), "tenant-abc");
        assert_eq!(env.parent_og(), Some("570"));
    }

    #[test]
    fn strips_trailing_slash() {
        let env = Environment::new("https://uem.example.com/API/", "t", None).unwrap();
        assert_eq!(env.api_url(), "https://uem.example.com/API");
        assert_eq!(
            env.endpoint("/mdm/devices/42"),
            "https://uem.example.com/API/mdm/devices/42"
        );
        assert_eq!(
            env.endpoint("mdm/devices/42"),
            "https://uem.example.com/API/mdm/devices/42"
        );
    }

    #[test]
    fn empty_api_url_is_rejected() {
        let err = Environment::new("", "tenant", None).unwrap_err();
        assert!(matches!(err, UemError::Config { .. }));
    }

    #[test]
    fn empty_tenant_code_is_rejected() {
        let err = Environment::new("https://uem.example.com/API", "  ", None).unwrap_err();
        assert!(matches!(err, UemError::Config { .. }));
        assert!(err.to_string().contains("tenant code"));
    }

    #[test]
    fn relative_api_url_is_rejected() {
        let err = Environment::new("uem.example.com/API", "tenant", None).unwrap_err();
        assert!(matches!(err, UemError::Config { .. }));
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let err = Environment::new("ftp://uem.example.com/API", "tenant", None).unwrap_err();
        assert!(matches!(err, UemError::Config { .. }));
    }

    #[test]
    fn blank_parent_og_is_treated_as_absent() {
        let env = Environment::new("https://uem.example.com/API", "t", Some("")).unwrap();
        assert!(env.parent_og().is_none());
    }
}
