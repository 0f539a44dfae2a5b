//! Provides the public-key fetcher used by the benchmark runner.

use crate::asymmetric::KeyExchangeScheme;
use crate::contract::{PublicKeyMaterial, PublicKeyResponse, SchemeId};
use crate::error::{BenchError, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use tracing::{debug, warn};

/// A source of raw key-issuing responses.
///
/// Implementations perform one synchronous retrieval per call and return the
/// response body. They must not retry: the next benchmark tick is the retry.
pub trait KeySource {
    fn fetch(&self, scheme: SchemeId) -> Result<String>;
}

impl<T: KeySource + ?Sized> KeySource for Box<T> {
    fn fetch(&self, scheme: SchemeId) -> Result<String> {
        (**self).fetch(scheme)
    }
}

impl<T: KeySource + ?Sized> KeySource for std::sync::Arc<T> {
    fn fetch(&self, scheme: SchemeId) -> Result<String> {
        (**self).fetch(scheme)
    }
}

/// A public key fetched for one tick: the encoded material plus the parsed key.
#[derive(Debug, Clone)]
pub struct FetchedKey<P> {
    pub material: PublicKeyMaterial,
    pub key: P,
}

/// Retrieves, decodes and imports public keys for a given scheme.
pub struct PublicKeyFetcher<S> {
    source: S,
}

impl<S: KeySource> PublicKeyFetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches a fresh public key for the scheme `K`.
    ///
    /// # Errors
    ///
    /// * `Transport` if the source cannot be reached or answers with a non-success status.
    /// * `Decode` if the payload is not valid JSON or the key is not valid Base64.
    /// * `KeyParse` if the decoded bytes are not a valid key for the scheme.
    pub fn fetch<K: KeyExchangeScheme>(&self, scheme: &K) -> Result<FetchedKey<K::PublicKey>> {
        let body = self.source.fetch(K::SCHEME)?;
        let material = decode_response(K::SCHEME, &body)?;
        let key = scheme.import_public_key(&material.bytes)?;

        let nominal = scheme.nominal_key_size(&key, &material.bytes);
        if material.declared_size != nominal {
            warn!(
                scheme = %K::SCHEME,
                declared = material.declared_size,
                actual = nominal,
                "declared key_size does not match the received key"
            );
        }

        Ok(FetchedKey { material, key })
    }
}

/// Parses a key-issuing payload and decodes its Base64 key.
pub fn decode_response(scheme: SchemeId, body: &str) -> Result<PublicKeyMaterial> {
    let response: PublicKeyResponse = serde_json::from_str(body)
        .map_err(|e| BenchError::decode(scheme, format!("JSON解码失败: {}", e)))?;

    if let Some(algorithm) = &response.algorithm {
        debug!(scheme = %scheme, algorithm = %algorithm, "issuer advertised algorithm");
    }

    let bytes = STANDARD
        .decode(response.public_key.trim())
        .map_err(|e| BenchError::decode(scheme, format!("Base64解码失败: {}", e)))?;

    Ok(PublicKeyMaterial {
        scheme,
        bytes,
        declared_size: response.key_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asymmetric::MlKemScheme;
    use crate::server::issuer::{KeyIssuer, MlKemKeyIssuer};
    use std::cell::Cell;

    struct CannedSource {
        body: String,
        calls: Cell<usize>,
    }

    impl KeySource for CannedSource {
        fn fetch(&self, _scheme: SchemeId) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.body.clone())
        }
    }

    struct DownSource;

    impl KeySource for DownSource {
        fn fetch(&self, scheme: SchemeId) -> Result<String> {
            Err(BenchError::transport(scheme, "connection refused"))
        }
    }

    fn canned(body: impl Into<String>) -> PublicKeyFetcher<CannedSource> {
        PublicKeyFetcher::new(CannedSource {
            body: body.into(),
            calls: Cell::new(0),
        })
    }

    #[test]
    fn test_fetch_valid_mlkem_key() {
        let issued = MlKemKeyIssuer::new().issue().unwrap();
        let body = serde_json::to_string(&issued.response).unwrap();
        let fetcher = canned(body);

        let fetched = fetcher.fetch(&MlKemScheme::default()).unwrap();
        assert_eq!(fetched.material.scheme, SchemeId::MlKem);
        assert_eq!(fetched.material.len(), 1184);
        assert_eq!(fetched.material.declared_size, 1184);
        assert_eq!(fetcher.source().calls.get(), 1);
    }

    #[test]
    fn test_malformed_base64_is_decode_error() {
        let fetcher = canned(r#"{"public_key":"!!not base64!!","key_size":1184}"#);
        let err = fetcher.fetch(&MlKemScheme::default()).err().unwrap();
        assert!(matches!(err, BenchError::Decode { scheme: SchemeId::MlKem, .. }));
    }

    #[test]
    fn test_malformed_json_is_decode_error() {
        let fetcher = canned("<html>not json</html>");
        let err = fetcher.fetch(&MlKemScheme::default()).err().unwrap();
        assert!(matches!(err, BenchError::Decode { .. }));
    }

    #[test]
    fn test_wrong_key_bytes_is_key_parse_error() {
        let fetcher = canned(r#"{"public_key":"AAECAwQ=","key_size":5}"#);
        let err = fetcher.fetch(&MlKemScheme::default()).err().unwrap();
        assert!(matches!(err, BenchError::KeyParse { .. }));
    }

    #[test]
    fn test_transport_error_is_propagated() {
        let fetcher = PublicKeyFetcher::new(DownSource);
        let err = fetcher.fetch(&MlKemScheme::default()).err().unwrap();
        assert!(matches!(err, BenchError::Transport { .. }));
    }

    #[test]
    fn test_missing_algorithm_field_is_accepted() {
        let material = decode_response(SchemeId::Rsa, r#"{"public_key":"AAEC","key_size":2048}"#)
            .unwrap();
        assert_eq!(material.bytes, vec![0, 1, 2]);
        assert_eq!(material.declared_size, 2048);
    }
}
