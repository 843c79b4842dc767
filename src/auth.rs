//! `CMSURL` certificate authentication for the Workspace ONE UEM API.
//!
//! Every REST call carries an `Authorization` header of the form
//!
//! ```text
//! CMSURL`1 <base64 DER CMS SignedData>
//! ```
//!
//! where the SignedData is a detached PKCS#7/CMS signature (SHA-512, RSA
//! PKCS#1 v1.5) over the request's canonical path. The canonical path is
//! the URL path alone: scheme, host and query string are excluded, and the
//! server rebuilds the same string to verify the signature. The signer's
//! certificate travels inside the container so the server can match it
//! against the certificate registered in the console.
//!
//! Certificate lifecycle:
//! - Default: the PKCS#12 bundle is re-read and re-decrypted for every
//!   signature. Nothing sensitive outlives the call.
//! - Opt-in cache ([`CmsUrlSigner::with_cache`]): the decoded key and
//!   certificate stay in memory until [`CmsUrlSigner::invalidate`] is
//!   called or the signer is dropped. PKCS#12 decryption runs a PBKDF over
//!   the password, so high-volume callers should enable the cache.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use cms::builder::{SignedDataBuilder, SignerInfoBuilder};
use cms::cert::{CertificateChoices, IssuerAndSerialNumber};
use cms::signed_data::{EncapsulatedContentInfo, SignerIdentifier};
use const_oid::ObjectIdentifier;
use der::{Decode, Encode};
use openssl::pkey::Id;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::{Signature, SigningKey};
use rsa::RsaPrivateKey;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha512};
use spki::AlgorithmIdentifierOwned;
use url::Url;
use x509_cert::Certificate;

use crate::certificate::{CertificateSource, ClientCertificate};
use crate::error::{Result, UemError};

/// Literal tag the server expects in front of the base64 signature.
pub const CMSURL_PREFIX: &str = "CMSURL`1 ";

/// `id-data` content type (RFC 5652 §4).
const ID_DATA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.1");

/// `id-sha512` digest algorithm (RFC 5754 §2.4).
const ID_SHA_512: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.3");

/// A ready-to-send `Authorization` header value.
///
/// Bound to the canonical path it was computed for; never reuse it for a
/// different URL.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedHeader(String);

impl SignedHeader {
    fn from_der(der: &[u8]) -> Self {
        SignedHeader(format!("{CMSURL_PREFIX}{}", STANDARD.encode(der)))
    }

    /// Full header value including the `CMSURL`1 ` prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The base64-encoded DER container without the prefix.
    pub fn signature_base64(&self) -> &str {
        &self.0[CMSURL_PREFIX.len()..]
    }

    /// Consumes the header and returns the owned value.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for SignedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignedHeader(<{} chars>)", self.0.len())
    }
}

/// Extracts the signing input for a request URL: the path component only.
///
/// The path is taken in its percent-encoded form, exactly as it appears on
/// the request line that reaches the server.
///
/// # Errors
///
/// `UemError::Signing` when `url` is not an absolute URL with a
/// hierarchical path (e.g. `mailto:` or a bare relative path).
pub fn canonical_path(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|err| UemError::Signing {
        message: format!("cannot derive canonical path from {url:?}"),
        source: Some(Box::new(err)),
    })?;
    if parsed.cannot_be_a_base() {
        return Err(UemError::signing(format!(
            "URL {url:?} has no hierarchical path to sign"
        )));
    }
    Ok(parsed.path().to_string())
}

/// Produces `CMSURL` headers from a PKCS#12 client certificate.
///
/// `CmsUrlSigner` is `Send + Sync`; one instance can serve concurrent
/// requests. Without the cache every call decodes the bundle on its own,
/// so there is no shared signing state.
pub struct CmsUrlSigner {
    source: CertificateSource,
    password: SecretString,
    cache: Option<RwLock<Option<Arc<ClientCertificate>>>>,
}

impl fmt::Debug for CmsUrlSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CmsUrlSigner")
            .field("source", &self.source)
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl CmsUrlSigner {
    /// Signer backed by a PKCS#12 file that is read on every load.
    ///
    /// The file is not opened here; a missing or unreadable file surfaces
    /// as `UemError::Certificate` on the first signature.
    ///
    /// # Errors
    ///
    /// `UemError::Config` when the path or password is empty.
    pub fn from_file(path: impl Into<PathBuf>, password: SecretString) -> Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(UemError::config("certificate path must not be empty"));
        }
        Self::new(CertificateSource::File(path), password)
    }

    /// Signer backed by PKCS#12 bytes already in memory (e.g. a mounted
    /// secret). No filesystem access happens at signing time.
    ///
    /// # Errors
    ///
    /// `UemError::Config` when the bundle or password is empty.
    pub fn from_memory(bundle: impl Into<Vec<u8>>, password: SecretString) -> Result<Self> {
        let bundle = bundle.into();
        if bundle.is_empty() {
            return Err(UemError::config("certificate bundle must not be empty"));
        }
        Self::new(CertificateSource::Memory(bundle), password)
    }

    fn new(source: CertificateSource, password: SecretString) -> Result<Self> {
        if password.expose_secret().is_empty() {
            return Err(UemError::config("certificate password must not be empty"));
        }
        Ok(CmsUrlSigner {
            source,
            password,
            cache: None,
        })
    }

    /// Keeps the decoded key and certificate in memory after the first load.
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(RwLock::new(None));
        self
    }

    /// Drops any cached certificate so the next signature reloads the
    /// bundle. No-op when caching is disabled.
    pub fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            *cache.write().unwrap_or_else(PoisonError::into_inner) = None;
        }
    }

    /// Whether this signer holds decoded material between calls.
    pub fn is_caching(&self) -> bool {
        self.cache.is_some()
    }

    /// Signs the canonical path of `url` and returns the header value.
    ///
    /// # Errors
    ///
    /// - `UemError::Certificate` — the bundle could not be loaded.
    /// - `UemError::Signing` — the URL has no path, the key is not RSA,
    ///   or CMS encoding failed.
    pub fn header_for(&self, url: &str) -> Result<SignedHeader> {
        let path = canonical_path(url)?;
        tracing::debug!(canonical_path = %path, "signing request path");

        let certificate = self.certificate().inspect_err(|err| {
            tracing::error!(
                error = %err,
                "failed to load client certificate; no CMSURL header produced"
            );
        })?;

        let der = sign_detached(&certificate, path.as_bytes()).inspect_err(|err| {
            tracing::error!(error = %err, "CMS signing failed; no CMSURL header produced");
        })?;

        Ok(SignedHeader::from_der(&der))
    }

    fn certificate(&self) -> Result<Arc<ClientCertificate>> {
        let Some(cache) = &self.cache else {
            return ClientCertificate::load(&self.source, &self.password).map(Arc::new);
        };

        if let Some(cached) = cache.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            return Ok(Arc::clone(cached));
        }

        let mut slot = cache.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have filled the slot while we waited.
        if let Some(cached) = slot.as_ref() {
            return Ok(Arc::clone(cached));
        }
        let loaded = Arc::new(ClientCertificate::load(&self.source, &self.password)?);
        *slot = Some(Arc::clone(&loaded));
        Ok(loaded)
    }
}

/// Builds a DER-encoded detached CMS SignedData over `content`.
///
/// The container holds one SignerInfo (issuer-and-serial identifier,
/// SHA-512, RSA PKCS#1 v1.5) with the standard content-type and
/// message-digest signed attributes, plus the signer certificate.
fn sign_detached(client: &ClientCertificate, content: &[u8]) -> Result<Vec<u8>> {
    let key_type = client.key().id();
    if key_type != Id::RSA {
        return Err(UemError::signing(format!(
            "unsupported private key type {key_type:?}; CMSURL signing requires an RSA key"
        )));
    }

    let pkcs1 = client
        .key()
        .rsa()
        .and_then(|rsa| rsa.private_key_to_der())
        .map_err(|err| UemError::Signing {
            message: "failed to export RSA private key".to_string(),
            source: Some(Box::new(err)),
        })?;
    let private_key = RsaPrivateKey::from_pkcs1_der(&pkcs1)
        .map_err(|err| UemError::signing(format!("failed to decode RSA private key: {err}")))?;

    let cert_der = client.certificate().to_der().map_err(|err| UemError::Signing {
        message: "failed to encode signer certificate".to_string(),
        source: Some(Box::new(err)),
    })?;
    let certificate = Certificate::from_der(&cert_der)
        .map_err(|err| UemError::signing(format!("failed to decode signer certificate: {err}")))?;

    let signer = SigningKey::<Sha512>::new(private_key);
    let digest_algorithm = AlgorithmIdentifierOwned {
        oid: ID_SHA_512,
        parameters: None,
    };
    // Detached: no eContent, the digest of the external content is supplied instead.
    let content_info = EncapsulatedContentInfo {
        econtent_type: ID_DATA,
        econtent: None,
    };
    let message_digest = Sha512::digest(content);
    let signer_id = SignerIdentifier::IssuerAndSerialNumber(IssuerAndSerialNumber {
        issuer: certificate.tbs_certificate.issuer.clone(),
        serial_number: certificate.tbs_certificate.serial_number.clone(),
    });

    let signer_info = SignerInfoBuilder::new(
        &signer,
        signer_id,
        digest_algorithm.clone(),
        &content_info,
        Some(message_digest.as_slice()),
    )
    .map_err(cms_error)?;

    let mut builder = SignedDataBuilder::new(&content_info);
    let container = builder
        .add_digest_algorithm(digest_algorithm)
        .map_err(cms_error)?
        .add_certificate(CertificateChoices::Certificate(certificate))
        .map_err(cms_error)?
        .add_signer_info::<SigningKey<Sha512>, Signature>(signer_info)
        .map_err(cms_error)?
        .build()
        .map_err(cms_error)?;

    container
        .to_der()
        .map_err(|err| UemError::signing(format!("failed to DER-encode CMS container: {err}")))
}

fn cms_error(err: cms::builder::Error) -> UemError {
    UemError::signing(format!("failed to build CMS SignedData: {err:?}"))
}
