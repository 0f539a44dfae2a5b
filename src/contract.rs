//! Defines the data structures exchanged between the key-issuing services and the
//! benchmark client.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one of the two public-key schemes being compared.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SchemeId {
    /// Classical RSA-2048 with OAEP padding.
    Rsa,
    /// Post-quantum ML-KEM-768 (Kyber-768) key encapsulation.
    MlKem,
}

impl SchemeId {
    /// Stable lowercase label, used in metric names and log fields.
    pub const fn label(self) -> &'static str {
        match self {
            SchemeId::Rsa => "rsa",
            SchemeId::MlKem => "mlkem",
        }
    }

    /// Human-readable algorithm name, as advertised by the issuing service.
    pub const fn algorithm_name(self) -> &'static str {
        match self {
            SchemeId::Rsa => "RSA-2048",
            SchemeId::MlKem => "ML-KEM-768 (Kyber-768)",
        }
    }
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The payload returned by a key-issuing endpoint.
///
/// `algorithm` is optional: the RSA service historically omitted it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyResponse {
    /// The Base64-encoded public key.
    pub public_key: String,
    /// The key size declared by the issuer. The unit depends on the scheme:
    /// modulus bits for RSA, encoded public-key bytes for ML-KEM.
    pub key_size: usize,
    /// The name of the algorithm the key belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
}

/// A decoded public key together with the metadata the issuer declared for it.
///
/// Produced once per tick and dropped when the tick completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyMaterial {
    pub scheme: SchemeId,
    /// Encoded key bytes (SubjectPublicKeyInfo DER for RSA, raw bytes for ML-KEM).
    pub bytes: Vec<u8>,
    pub declared_size: usize,
}

impl PublicKeyMaterial {
    /// The measured size of the key, which is what the benchmark reports.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
