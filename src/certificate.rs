//! PKCS#12 client-certificate loading.
//!
//! The UEM API authenticates callers with a certificate issued by the
//! console ("Certificate Authentication" under the REST API settings). The
//! certificate is exported as a password-protected PKCS#12 bundle and is
//! either read from disk or injected as raw bytes (e.g. from a secret
//! store). Both variants decode through the same OpenSSL path.

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;

use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, PKeyRef, Private};
use openssl::x509::{X509, X509Ref};
use secrecy::{ExposeSecret, SecretString};

use crate::error::{Result, UemError};

/// Where the PKCS#12 bundle comes from.
#[derive(Clone)]
pub enum CertificateSource {
    /// A `.p12` / `.pfx` file read on every load.
    File(PathBuf),
    /// Bundle bytes held in memory; no filesystem access.
    Memory(Vec<u8>),
}

impl fmt::Debug for CertificateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificateSource::File(path) => f.debug_tuple("File").field(path).finish(),
            CertificateSource::Memory(bytes) => write!(f, "Memory(<{} bytes>)", bytes.len()),
        }
    }
}

impl CertificateSource {
    fn read(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            CertificateSource::File(path) => std::fs::read(path)
                .map(Cow::Owned)
                .map_err(|err| {
                    UemError::certificate(
                        format!("cannot read PKCS#12 file {}", path.display()),
                        err,
                    )
                }),
            CertificateSource::Memory(bytes) => Ok(Cow::Borrowed(bytes.as_slice())),
        }
    }
}

/// Private key and X.509 certificate decoded from a PKCS#12 bundle.
pub struct ClientCertificate {
    key: PKey<Private>,
    certificate: X509,
}

impl fmt::Debug for ClientCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCertificate")
            .field("key_type", &self.key.id())
            .finish_non_exhaustive()
    }
}

impl ClientCertificate {
    /// Reads and decrypts the bundle.
    ///
    /// # Errors
    ///
    /// `UemError::Certificate` when the file cannot be read, the bytes are
    /// not PKCS#12, the password is wrong, or the bundle lacks a key or a
    /// certificate. Partial material is never returned.
    pub fn load(source: &CertificateSource, password: &SecretString) -> Result<Self> {
        let der = source.read()?;

        let bundle = Pkcs12::from_der(&der)
            .map_err(|err| UemError::certificate("PKCS#12 data is not valid DER", err))?;
        let parsed = bundle.parse2(password.expose_secret()).map_err(|err| {
            UemError::certificate(
                "failed to decrypt PKCS#12 bundle (wrong password or unsupported encryption)",
                err,
            )
        })?;

        let key = parsed.pkey.ok_or_else(|| UemError::Certificate {
            message: "PKCS#12 bundle contains no private key".to_string(),
            source: None,
        })?;
        let certificate = parsed.cert.ok_or_else(|| UemError::Certificate {
            message: "PKCS#12 bundle contains no certificate".to_string(),
            source: None,
        })?;

        tracing::debug!(key_type = ?key.id(), "loaded PKCS#12 client certificate");
        Ok(ClientCertificate { key, certificate })
    }

    /// The signer's private key.
    pub fn key(&self) -> &PKeyRef<Private> {
        &self.key
    }

    /// The signer's certificate, embedded in every CMS container.
    pub fn certificate(&self) -> &X509Ref {
        &self.certificate
    }
}
