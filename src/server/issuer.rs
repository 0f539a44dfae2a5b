//! Defines the key issuers that produce a fresh key pair for every request.
//!
//! 每次请求都生成新的密钥对，测量生成耗时，并把公钥编码为 `PublicKeyResponse`。

use crate::asymmetric::systems::traditional::rsa::DEFAULT_KEY_BITS;
use crate::asymmetric::{MlKemScheme, RsaOaepScheme};
use crate::contract::{PublicKeyResponse, SchemeId};
use crate::error::Result;
use base64::{Engine, engine::general_purpose::STANDARD};
use std::time::{Duration, Instant};
use tracing::info;

/// The outcome of a single issuance.
#[derive(Debug, Clone)]
pub struct IssuedKey {
    pub response: PublicKeyResponse,
    pub generation_time: Duration,
}

/// A key-issuing service for one scheme.
pub trait KeyIssuer {
    fn scheme(&self) -> SchemeId;

    /// Generates a new key pair and returns the public half as a response payload.
    /// The private half is discarded.
    fn issue(&self) -> Result<IssuedKey>;
}

/// RSA 密钥签发：公钥以 SubjectPublicKeyInfo DER 编码，`key_size` 声明模数位数。
#[derive(Debug, Clone, Copy)]
pub struct RsaKeyIssuer {
    bits: usize,
}

impl RsaKeyIssuer {
    pub fn new(bits: usize) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> usize {
        self.bits
    }
}

impl Default for RsaKeyIssuer {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_BITS)
    }
}

impl KeyIssuer for RsaKeyIssuer {
    fn scheme(&self) -> SchemeId {
        SchemeId::Rsa
    }

    fn issue(&self) -> Result<IssuedKey> {
        let start = Instant::now();
        let (_private_key, public_der) = RsaOaepScheme::generate_keypair(self.bits)?;
        let generation_time = start.elapsed();
        info!(scheme = "rsa", bits = self.bits, ?generation_time, "generated new key pair");

        Ok(IssuedKey {
            response: PublicKeyResponse {
                public_key: STANDARD.encode(&public_der),
                key_size: self.bits,
                algorithm: None,
            },
            generation_time,
        })
    }
}

/// ML-KEM 密钥签发：公钥为原始字节，`key_size` 声明字节数。
#[derive(Debug, Clone, Copy, Default)]
pub struct MlKemKeyIssuer;

impl MlKemKeyIssuer {
    pub fn new() -> Self {
        Self
    }
}

impl KeyIssuer for MlKemKeyIssuer {
    fn scheme(&self) -> SchemeId {
        SchemeId::MlKem
    }

    fn issue(&self) -> Result<IssuedKey> {
        let start = Instant::now();
        let (public_key, _secret_key) = MlKemScheme::generate_keypair();
        let generation_time = start.elapsed();
        info!(scheme = "mlkem", ?generation_time, "generated new key pair");

        Ok(IssuedKey {
            response: PublicKeyResponse {
                public_key: STANDARD.encode(&public_key),
                key_size: public_key.len(),
                algorithm: Some(SchemeId::MlKem.algorithm_name().to_string()),
            },
            generation_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mlkem_issuer_payload() {
        let issued = MlKemKeyIssuer::new().issue().unwrap();
        let decoded = STANDARD.decode(&issued.response.public_key).unwrap();
        assert_eq!(decoded.len(), 1184);
        assert_eq!(issued.response.key_size, 1184);
        assert_eq!(
            issued.response.algorithm.as_deref(),
            Some("ML-KEM-768 (Kyber-768)")
        );
    }

    #[test]
    fn test_every_issue_is_a_new_key() {
        let issuer = MlKemKeyIssuer::new();
        let a = issuer.issue().unwrap();
        let b = issuer.issue().unwrap();
        assert_ne!(a.response.public_key, b.response.public_key);
    }

    #[test]
    fn test_rsa_issuer_payload() {
        let issued = RsaKeyIssuer::default().issue().unwrap();
        let decoded = STANDARD.decode(&issued.response.public_key).unwrap();
        // RSA-2048 SubjectPublicKeyInfo DER
        assert_eq!(decoded.len(), 294);
        assert_eq!(issued.response.key_size, 2048);
        assert!(issued.response.algorithm.is_none());
    }
}
