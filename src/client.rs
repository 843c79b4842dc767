//! Authenticated request dispatcher for the Workspace ONE UEM REST API.
//!
//! `UemClient` owns a pooled blocking `reqwest` client, the tenant
//! [`Environment`] and a [`CmsUrlSigner`]. Every call goes through
//! [`UemClient::send`]:
//!
//! 1. Resolve `{api_url}/{path}`, any caller-supplied path segments and the
//!    encoded query pairs into a `Url`.
//! 2. Sign that URL's canonical path. A certificate or signing failure
//!    returns here; nothing is sent.
//! 3. Assemble headers: `aw-tenant-code`, `Content-Type: application/json`
//!    (omitted for multipart uploads), caller overrides, and finally the
//!    freshly signed `Authorization`, so exactly one is always present.
//! 4. Send with a 90-second timeout. Statuses 500/502/503/504 on idempotent
//!    methods are retried by the configured [`RetryPolicy`] (3 retries,
//!    1s/2s/4s by default). `POST` and `PATCH` are sent once. 4xx and
//!    transport errors are never retried.
//! 5. Success with an empty body yields `{}`; any other body is parsed as
//!    JSON. Non-success yields `UemError::Request` with status and body.
//!
//! The signed header is computed once per call and reused for the retries
//! of that same URL; it is never reused for a different URL.

use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use backoff::ExponentialBackoffBuilder;
use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::auth::{CmsUrlSigner, SignedHeader};
use crate::environment::Environment;
use crate::error::{Result, UemError};

/// Header carrying the tenant's REST API key.
pub const TENANT_CODE_HEADER: &str = "aw-tenant-code";

/// Accept type required by the versioned (`version=1`) endpoints.
pub const VERSIONED_JSON: &str = "application/json;version=1";

/// Overall per-request timeout, including the response body download.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// TCP + TLS handshake timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Server statuses treated as transient by the transport retry.
pub const RETRY_STATUSES: [StatusCode; 4] = [
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Methods safe to repeat after a transient server error.
pub const IDEMPOTENT_METHODS: [Method; 6] = [
    Method::DELETE,
    Method::GET,
    Method::HEAD,
    Method::OPTIONS,
    Method::PUT,
    Method::TRACE,
];

// ── Retry policy ───────────────────────────────────────────────────────

/// Transport-level retry for transient server errors.
///
/// `max_retries` counts retries after the first attempt, so the default
/// policy makes at most four requests. Delays grow as
/// `initial_backoff * multiplier^n` without jitter. Only
/// [`IDEMPOTENT_METHODS`] are retried.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt. `0` disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Growth factor applied to the delay after each retry.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that sends every request exactly once.
    pub fn disabled() -> Self {
        RetryPolicy {
            max_retries: 0,
            ..RetryPolicy::default()
        }
    }

    /// Whether `status` is one of the transient statuses this policy retries.
    pub fn retries_status(&self, status: StatusCode) -> bool {
        self.max_retries > 0 && RETRY_STATUSES.contains(&status)
    }

    /// Whether a `method` request answered with `status` is sent again.
    pub fn retries(&self, method: &Method, status: StatusCode) -> bool {
        IDEMPOTENT_METHODS.contains(method) && self.retries_status(status)
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_backoff)
            .with_multiplier(self.multiplier)
            .with_randomization_factor(0.0)
            .with_max_elapsed_time(None)
            .build()
    }
}

// ── Request description ────────────────────────────────────────────────

/// A binary file sent as the `file` part of a multipart upload.
#[derive(Debug, Clone)]
pub struct FilePayload {
    /// File name reported in the part's `Content-Disposition`.
    pub file_name: String,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl FilePayload {
    /// Wraps raw bytes under the given file name.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        FilePayload {
            file_name: file_name.into(),
            bytes,
        }
    }

    // A multipart form is consumed on send, so each attempt gets a new one.
    fn form(&self) -> multipart::Form {
        let part = multipart::Part::bytes(self.bytes.clone()).file_name(self.file_name.clone());
        multipart::Form::new().part("file", part)
    }
}

/// One API call: method, path relative to the REST root, query pairs,
/// optional JSON or file body, and per-call header overrides.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    body: Option<Value>,
    file: Option<FilePayload>,
    headers: HeaderMap,
}

impl ApiRequest {
    /// Starts a request for `path`, relative to the REST root.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            segments: Vec::new(),
            query: Vec::new(),
            body: None,
            file: None,
            headers: HeaderMap::new(),
        }
    }

    /// `GET path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST path`.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// `PUT path`.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// `PATCH path`.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// `DELETE path`.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Appends one path segment after `path`.
    ///
    /// The value is percent-encoded as a single segment, so a `/`, `?` or
    /// `#` inside an identifier cannot change the request path (and with it
    /// the signed path). `.` and `..` are dropped.
    pub fn segment(mut self, value: impl ToString) -> Self {
        self.segments.push(value.to_string());
        self
    }

    /// Appends literal path segments after an identifier segment, e.g.
    /// `"androidwork/apps/import"`. Only for fixed strings: each `/`
    /// separated piece becomes its own segment.
    pub fn path_suffix(mut self, suffix: &str) -> Self {
        self.segments.extend(
            suffix
                .split('/')
                .filter(|piece| !piece.is_empty())
                .map(str::to_owned),
        );
        self
    }

    /// Appends a query pair. Values are percent-encoded on resolution.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Appends a query pair only when `value` is `Some`.
    pub fn query_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Sets the JSON body.
    ///
    /// # Errors
    ///
    /// `UemError::Parse` if `body` cannot be represented as JSON (e.g. a map
    /// with non-string keys).
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Sends `file` as a multipart upload instead of a JSON body.
    pub fn file(mut self, file: FilePayload) -> Self {
        self.file = Some(file);
        self
    }

    /// Overrides or adds a header for this call only.
    ///
    /// `Authorization` cannot be overridden; the signed value always wins.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Requests the `application/json;version=1` representation.
    pub fn versioned(self) -> Self {
        self.header(ACCEPT, HeaderValue::from_static(VERSIONED_JSON))
    }

    /// HTTP method of this request.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Literal path relative to the REST root, without appended segments.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Segments appended with [`ApiRequest::segment`], unencoded.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Query pairs in insertion order.
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// JSON body, if one was set.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Per-call header overrides.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

// ── Client ─────────────────────────────────────────────────────────────

/// Builder for [`UemClient`].
pub struct UemClientBuilder {
    environment: Environment,
    signer: CmsUrlSigner,
    retry: RetryPolicy,
    timeout: Duration,
    connect_timeout: Duration,
}

impl UemClientBuilder {
    /// Replaces the default transport retry policy.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Overrides the 90-second request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the 10-second connect timeout.
    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// `UemError::Config` when the tenant code is not a valid header value
    /// or the HTTP client cannot be initialized (e.g. TLS backend failure).
    pub fn build(self) -> Result<UemClient> {
        let tenant_code = HeaderValue::from_str(self.environment.tenant_code()).map_err(|_| {
            UemError::config("tenant code contains characters not allowed in an HTTP header")
        })?;

        let http = Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.timeout)
            .build()
            .map_err(|err| UemError::config(format!("failed to build HTTP client: {err}")))?;

        Ok(UemClient {
            http,
            environment: self.environment,
            signer: self.signer,
            retry: self.retry,
            tenant_code,
        })
    }
}

/// Authenticated HTTP client for one UEM tenant.
///
/// The underlying connection pool is reused across calls. All resource
/// modules (`mdm`, `mam`, `system`) dispatch through the same client and
/// therefore share one retry policy.
pub struct UemClient {
    http: Client,
    environment: Environment,
    signer: CmsUrlSigner,
    retry: RetryPolicy,
    tenant_code: HeaderValue,
}

impl UemClient {
    /// Client with the default retry policy and timeouts.
    ///
    /// # Errors
    ///
    /// See [`UemClientBuilder::build`].
    pub fn new(environment: Environment, signer: CmsUrlSigner) -> Result<Self> {
        Self::builder(environment, signer).build()
    }

    /// Starts a builder for non-default retry or timeout settings.
    pub fn builder(environment: Environment, signer: CmsUrlSigner) -> UemClientBuilder {
        UemClientBuilder {
            environment,
            signer,
            retry: RetryPolicy::default(),
            timeout: REQUEST_TIMEOUT,
            connect_timeout: CONNECT_TIMEOUT,
        }
    }

    /// Tenant settings this client was built with.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// The signer used for every request.
    pub fn signer(&self) -> &CmsUrlSigner {
        &self.signer
    }

    /// Transport retry policy applied to every request.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Resolves the request's path, segments and query against the REST
    /// root.
    ///
    /// # Errors
    ///
    /// `UemError::Request` (no status) if the joined URL does not parse.
    pub fn url(&self, request: &ApiRequest) -> Result<Url> {
        let raw = self.environment.endpoint(&request.path);
        let mut url = Url::parse(&raw)
            .map_err(|err| invalid_url(&raw, format!("invalid request URL: {err}")))?;
        if !request.segments.is_empty() {
            url.path_segments_mut()
                .map_err(|()| invalid_url(&raw, "request URL cannot carry path segments".into()))?
                .pop_if_empty()
                .extend(&request.segments);
        }
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    /// Sends `request` and returns the parsed JSON body.
    ///
    /// # Errors
    ///
    /// - `UemError::Certificate` / `UemError::Signing` — no header could be
    ///   produced; the request was not sent.
    /// - `UemError::Request` — non-success status (after any retries) or a
    ///   transport failure.
    /// - `UemError::Parse` — a success body that is not JSON.
    pub fn send(&self, request: ApiRequest) -> Result<Value> {
        let url = self.url(&request)?;
        let signed = self.signer.header_for(url.as_str())?;
        let headers = self.headers(&request, &signed)?;

        let mut backoff = self.retry.backoff();
        let mut retries = 0u32;
        loop {
            tracing::info!(
                method = %request.method,
                url = %url,
                attempt = retries + 1,
                has_body = request.body.is_some() || request.file.is_some(),
                "sending UEM API request"
            );

            let response = self
                .request_builder(&request, &url, &headers)
                .send()
                .map_err(|err| transport_error(&url, err))?;
            let status = response.status();

            if self.retry.retries(&request.method, status) && retries < self.retry.max_retries {
                if let Some(delay) = backoff.next_backoff() {
                    retries += 1;
                    tracing::warn!(
                        %status,
                        url = %url,
                        retry = retries,
                        delay_ms = delay.as_millis() as u64,
                        "transient server error, retrying"
                    );
                    drop(response);
                    std::thread::sleep(delay);
                    continue;
                }
            }

            return read_response(&url, response);
        }
    }

    /// Sends `request` and deserializes the body into `T`.
    ///
    /// # Errors
    ///
    /// As [`UemClient::send`], plus `UemError::Parse` when the JSON does
    /// not match `T`.
    pub fn send_as<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let value = self.send(request)?;
        Ok(serde_json::from_value(value)?)
    }

    /// `GET path`.
    pub fn get(&self, path: &str) -> Result<Value> {
        self.send(ApiRequest::get(path))
    }

    /// `POST path` with a JSON body.
    pub fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.send(ApiRequest::post(path).json(body)?)
    }

    /// `POST path` without a body (command-style endpoints).
    pub fn post_empty(&self, path: &str) -> Result<Value> {
        self.send(ApiRequest::post(path))
    }

    /// `PUT path` with a JSON body.
    pub fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.send(ApiRequest::put(path).json(body)?)
    }

    /// `DELETE path`.
    pub fn delete(&self, path: &str) -> Result<Value> {
        self.send(ApiRequest::delete(path))
    }

    fn headers(&self, request: &ApiRequest, signed: &SignedHeader) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(TENANT_CODE_HEADER),
            self.tenant_code.clone(),
        );
        if request.file.is_none() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        for (name, value) in &request.headers {
            headers.insert(name.clone(), value.clone());
        }

        let mut authorization = HeaderValue::from_str(signed.as_str())
            .map_err(|_| UemError::signing("signed header is not a valid HTTP header value"))?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);
        Ok(headers)
    }

    fn request_builder(
        &self,
        request: &ApiRequest,
        url: &Url,
        headers: &HeaderMap,
    ) -> RequestBuilder {
        let mut builder = self
            .http
            .request(request.method.clone(), url.clone())
            .headers(headers.clone());
        if let Some(file) = &request.file {
            builder = builder.multipart(file.form());
        } else if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        builder
    }
}

fn invalid_url(raw: &str, message: String) -> UemError {
    UemError::Request {
        status: None,
        url: raw.to_string(),
        message,
        source: None,
    }
}

fn transport_error(url: &Url, err: reqwest::Error) -> UemError {
    tracing::error!(url = %url, error = %err, "UEM API request did not complete");
    UemError::Request {
        status: err.status(),
        url: url.to_string(),
        message: err.to_string(),
        source: Some(err),
    }
}

fn read_response(url: &Url, response: Response) -> Result<Value> {
    let status = response.status();
    // Read the body before checking the status so API error details survive.
    let body = response.text().map_err(|err| transport_error(url, err))?;

    if !status.is_success() {
        tracing::error!(%status, url = %url, "UEM API request failed");
        return Err(UemError::Request {
            status: Some(status),
            url: url.to_string(),
            message: body,
            source: None,
        });
    }

    tracing::info!(%status, url = %url, "UEM API request succeeded");
    if body.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    Ok(serde_json::from_str(&body)?)
}
