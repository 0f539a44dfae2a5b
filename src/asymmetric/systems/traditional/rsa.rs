//! `RsaOaepScheme` 提供了基于 RSA-OAEP（SHA-256）的对称密钥包裹。

use crate::asymmetric::traits::KeyExchangeScheme;
use crate::contract::SchemeId;
use crate::error::{BenchError, Result};
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey};
use rsa::rand_core::OsRng as RsaOsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

/// OAEP 使用的哈希输出长度（SHA-256）。
const OAEP_HASH_LEN: usize = 32;

/// 默认模数长度
pub const DEFAULT_KEY_BITS: usize = 2048;

/// RSA-OAEP 包裹方案
#[derive(Debug, Clone, Copy, Default)]
pub struct RsaOaepScheme;

impl RsaOaepScheme {
    pub fn new() -> Self {
        Self
    }

    /// 给定公钥下 OAEP 能够承载的最大明文长度：`k - 2*hLen - 2`。
    pub fn max_payload(public_key: &RsaPublicKey) -> usize {
        public_key.size().saturating_sub(2 * OAEP_HASH_LEN + 2)
    }

    /// 生成密钥对，并把公钥导出为 SubjectPublicKeyInfo DER。
    pub fn generate_keypair(bits: usize) -> Result<(RsaPrivateKey, Vec<u8>)> {
        let mut rng = RsaOsRng;
        let private_key = RsaPrivateKey::new(&mut rng, bits).map_err(|e| {
            BenchError::KeyGeneration {
                scheme: SchemeId::Rsa,
                message: format!("生成RSA密钥失败: {}", e),
            }
        })?;
        let public_der = RsaPublicKey::from(&private_key)
            .to_public_key_der()
            .map_err(|e| BenchError::KeyGeneration {
                scheme: SchemeId::Rsa,
                message: format!("导出RSA公钥DER失败: {}", e),
            })?;
        Ok((private_key, public_der.as_bytes().to_vec()))
    }

    /// 用私钥解开被包裹的密钥。
    pub fn unwrap_key(private_key: &RsaPrivateKey, wrapped: &[u8]) -> Result<Vec<u8>> {
        private_key
            .decrypt(Oaep::new::<Sha256>(), wrapped)
            .map_err(|e| BenchError::Decrypt(format!("RSA解密失败: {}", e)))
    }
}

impl KeyExchangeScheme for RsaOaepScheme {
    type PublicKey = RsaPublicKey;

    const SCHEME: SchemeId = SchemeId::Rsa;

    fn import_public_key(&self, encoded: &[u8]) -> Result<Self::PublicKey> {
        RsaPublicKey::from_public_key_der(encoded)
            .map_err(|e| BenchError::key_parse(Self::SCHEME, format!("解析RSA公钥失败: {}", e)))
    }

    fn nominal_key_size(&self, public_key: &Self::PublicKey, _encoded: &[u8]) -> usize {
        public_key.size() * 8
    }

    fn wrap_key(&self, public_key: &Self::PublicKey, key: &[u8]) -> Result<Vec<u8>> {
        let max = Self::max_payload(public_key);
        if key.len() > max {
            return Err(BenchError::PayloadTooLarge {
                scheme: Self::SCHEME,
                len: key.len(),
                max,
            });
        }

        let mut rng = RsaOsRng;
        public_key
            .encrypt(&mut rng, Oaep::new::<Sha256>(), key)
            .map_err(|e| BenchError::wrap(Self::SCHEME, format!("RSA加密失败: {}", e)))
    }
}
