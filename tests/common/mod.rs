//! Shared fixtures for the integration tests.
//!
//! Certificates are generated at test time with OpenSSL: a self-signed RSA
//! certificate wrapped in a password-protected PKCS#12 bundle, matching what
//! the UEM console exports for certificate authentication.

#![allow(dead_code)]

use std::sync::OnceLock;
use std::time::Duration;

use base64::Engine;
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkcs12::Pkcs12;
use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::pkey::{PKey, PKeyRef, Private};
use openssl::rsa::Rsa;
use openssl::stack::Stack;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::{X509NameBuilder, X509};
use secrecy::SecretString;
use wiremock::MockServer;

use ws1_uem::auth::{CmsUrlSigner, CMSURL_PREFIX};
use ws1_uem::client::{RetryPolicy, UemClient};
use ws1_uem::environment::Environment;

pub const PASSWORD: &str = "fixture-password";
pub const TENANT_CODE: &str = "tenant-code-123";

/// PKCS#12 bundle with an RSA-2048 key, generated once per test binary.
pub fn rsa_bundle() -> Vec<u8> {
    static BUNDLE: OnceLock<Vec<u8>> = OnceLock::new();
    BUNDLE
        .get_or_init(|| {
            let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
            bundle_for(&key)
        })
        .clone()
}

/// PKCS#12 bundle with a P-256 key, which cannot produce `CMSURL` headers.
pub fn ec_bundle() -> Vec<u8> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    let key = PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap();
    bundle_for(&key)
}

fn bundle_for(key: &PKeyRef<Private>) -> Vec<u8> {
    let certificate = self_signed(key);
    Pkcs12::builder()
        .name("ws1-uem-test")
        .pkey(key)
        .cert(&certificate)
        .build2(PASSWORD)
        .unwrap()
        .to_der()
        .unwrap()
}

fn self_signed(key: &PKeyRef<Private>) -> X509 {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", "ws1-uem-test").unwrap();
    let name = name.build();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(4242).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(key).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(365).unwrap())
        .unwrap();
    builder.sign(key, MessageDigest::sha256()).unwrap();
    builder.build()
}

pub fn password() -> SecretString {
    SecretString::from(PASSWORD.to_string())
}

/// In-memory signer over the shared RSA bundle, with the certificate cache
/// enabled so each test decodes the bundle once.
pub fn signer() -> CmsUrlSigner {
    CmsUrlSigner::from_memory(rsa_bundle(), password())
        .unwrap()
        .with_cache()
}

/// Same backoff shape as the default policy, scaled down to milliseconds.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        initial_backoff: Duration::from_millis(10),
        multiplier: 2.0,
    }
}

/// Client pointed at `{server_uri}/API`.
pub fn mock_client(server_uri: &str, signer: CmsUrlSigner) -> UemClient {
    let environment =
        Environment::new(&format!("{server_uri}/API"), TENANT_CODE, Some("570")).unwrap();
    UemClient::builder(environment, signer)
        .retry_policy(fast_retry())
        .build()
        .unwrap()
}

/// Runs `f` against a fresh blocking client on a blocking thread.
///
/// The blocking reqwest client owns an internal runtime and must be created,
/// used and dropped outside the test's async context.
pub async fn with_client<T, F>(server: &MockServer, f: F) -> T
where
    F: FnOnce(&UemClient) -> T + Send + 'static,
    T: Send + 'static,
{
    with_signer(server, signer(), f).await
}

/// [`with_client`] with a caller-supplied signer.
pub async fn with_signer<T, F>(server: &MockServer, signer: CmsUrlSigner, f: F) -> T
where
    F: FnOnce(&UemClient) -> T + Send + 'static,
    T: Send + 'static,
{
    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        let client = mock_client(&uri, signer);
        f(&client)
    })
    .await
    .expect("blocking test task panicked")
}

/// Checks that `header` is a `CMSURL` header whose detached signature
/// verifies over exactly `path`.
pub fn verifies_over(header: &str, path: &str) -> bool {
    let Some(encoded) = header.strip_prefix(CMSURL_PREFIX) else {
        return false;
    };
    let Ok(der) = base64::engine::general_purpose::STANDARD.decode(encoded) else {
        return false;
    };
    let Ok(pkcs7) = Pkcs7::from_der(&der) else {
        return false;
    };
    let certs: Stack<X509> = Stack::new().unwrap();
    let store = X509StoreBuilder::new().unwrap().build();
    pkcs7
        .verify(
            &certs,
            &store,
            Some(path.as_bytes()),
            None,
            Pkcs7Flags::NOVERIFY | Pkcs7Flags::BINARY,
        )
        .is_ok()
}
