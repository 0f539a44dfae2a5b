use crate::asymmetric::traits::KeyExchangeScheme;
use crate::contract::SchemeId;
use crate::error::{BenchError, Result};
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use pqcrypto_kyber::kyber768;
use pqcrypto_traits::kem::{Ciphertext as _, PublicKey as _, SharedSecret as _};
use serde::{Deserialize, Serialize};

// Kyber-768 常量
pub const PUBLIC_KEY_BYTES: usize = kyber768::public_key_bytes();
pub const CIPHERTEXT_BYTES: usize = kyber768::ciphertext_bytes();
const NONCE_SIZE: usize = 12;

/// ML-KEM 包裹产物的构成方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MlKemWrapMode {
    /// 只做封装：产物为 KEM 密文，共享秘密被丢弃。
    #[default]
    EncapsulateOnly,
    /// 用共享秘密通过 AES-256-GCM 加密对称密钥：
    /// 产物为 `KEM密文 || nonce || AEAD密文`。
    BindSymmetricKey,
}

/// ML-KEM-768 包裹方案
///
/// 使用 Kyber-768 进行密钥封装，按 [`MlKemWrapMode`] 决定是否把对称密钥绑定进产物
#[derive(Debug, Clone, Copy, Default)]
pub struct MlKemScheme {
    mode: MlKemWrapMode,
}

impl MlKemScheme {
    pub fn new(mode: MlKemWrapMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> MlKemWrapMode {
        self.mode
    }

    /// 生成密钥对，返回原始公钥字节与私钥。
    pub fn generate_keypair() -> (Vec<u8>, kyber768::SecretKey) {
        let (pk, sk) = kyber768::keypair();
        (pk.as_bytes().to_vec(), sk)
    }

    /// 解封装，取回共享秘密。
    pub fn decapsulate(secret_key: &kyber768::SecretKey, wrapped: &[u8]) -> Result<Vec<u8>> {
        if wrapped.len() < CIPHERTEXT_BYTES {
            return Err(BenchError::Decrypt("Kyber768密文格式无效".to_string()));
        }
        let ct = kyber768::Ciphertext::from_bytes(&wrapped[..CIPHERTEXT_BYTES])
            .map_err(|_| BenchError::Decrypt("无效的Kyber768密文格式".to_string()))?;
        let ss = kyber768::decapsulate(&ct, secret_key);
        Ok(ss.as_bytes().to_vec())
    }

    /// 从 `BindSymmetricKey` 模式的产物中取回对称密钥。
    pub fn unwrap_key(&self, secret_key: &kyber768::SecretKey, wrapped: &[u8]) -> Result<Vec<u8>> {
        if self.mode != MlKemWrapMode::BindSymmetricKey {
            return Err(BenchError::Decrypt(
                "仅封装模式的产物不携带对称密钥".to_string(),
            ));
        }
        if wrapped.len() < CIPHERTEXT_BYTES + NONCE_SIZE {
            return Err(BenchError::Decrypt("包裹产物过短".to_string()));
        }

        let shared_secret = Self::decapsulate(secret_key, wrapped)?;
        let (nonce_bytes, sealed) = wrapped[CIPHERTEXT_BYTES..].split_at(NONCE_SIZE);
        let cipher = Aes256Gcm::new_from_slice(&shared_secret)
            .map_err(|e| BenchError::CipherInit(format!("创建AEAD解密器失败: {}", e)))?;
        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), sealed)
            .map_err(|e| BenchError::Decrypt(format!("AEAD解密失败: {}", e)))
    }
}

impl KeyExchangeScheme for MlKemScheme {
    type PublicKey = kyber768::PublicKey;

    const SCHEME: SchemeId = SchemeId::MlKem;

    fn import_public_key(&self, encoded: &[u8]) -> Result<Self::PublicKey> {
        if encoded.len() != PUBLIC_KEY_BYTES {
            return Err(BenchError::key_parse(
                Self::SCHEME,
                format!(
                    "无效的Kyber768公钥长度: {} (期望 {})",
                    encoded.len(),
                    PUBLIC_KEY_BYTES
                ),
            ));
        }
        kyber768::PublicKey::from_bytes(encoded)
            .map_err(|e| BenchError::key_parse(Self::SCHEME, format!("无效的Kyber768公钥格式: {:?}", e)))
    }

    fn nominal_key_size(&self, _public_key: &Self::PublicKey, encoded: &[u8]) -> usize {
        encoded.len()
    }

    fn wrap_key(&self, public_key: &Self::PublicKey, key: &[u8]) -> Result<Vec<u8>> {
        let (shared_secret, ciphertext) = kyber768::encapsulate(public_key);

        match self.mode {
            MlKemWrapMode::EncapsulateOnly => Ok(ciphertext.as_bytes().to_vec()),
            MlKemWrapMode::BindSymmetricKey => {
                let cipher = Aes256Gcm::new_from_slice(shared_secret.as_bytes())
                    .map_err(|e| BenchError::wrap(Self::SCHEME, format!("创建AEAD加密器失败: {}", e)))?;
                let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
                let sealed = cipher
                    .encrypt(&nonce, key)
                    .map_err(|e| BenchError::wrap(Self::SCHEME, format!("AEAD加密失败: {}", e)))?;

                // 组合数据：kyber密文 + nonce + AEAD密文
                let mut combined = Vec::with_capacity(CIPHERTEXT_BYTES + NONCE_SIZE + sealed.len());
                combined.extend_from_slice(ciphertext.as_bytes());
                combined.extend_from_slice(&nonce);
                combined.extend_from_slice(&sealed);
                Ok(combined)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_keys() -> (Vec<u8>, kyber768::SecretKey) {
        MlKemScheme::generate_keypair()
    }

    #[test]
    fn test_kyber768_sizes() {
        assert_eq!(PUBLIC_KEY_BYTES, 1184);
        assert_eq!(CIPHERTEXT_BYTES, 1088);
    }

    #[test]
    fn test_encapsulate_only_produces_kem_ciphertext() {
        let (pk_bytes, sk) = setup_keys();
        let scheme = MlKemScheme::default();
        let public_key = scheme.import_public_key(&pk_bytes).unwrap();

        let (wrapped, sample) = scheme.wrap(&public_key, &[3u8; 32]).unwrap();
        assert_eq!(wrapped.len(), CIPHERTEXT_BYTES);
        assert_eq!(sample.scheme, SchemeId::MlKem);

        // 能解封装，但产物不携带对称密钥
        assert_eq!(MlKemScheme::decapsulate(&sk, &wrapped.bytes).unwrap().len(), 32);
        assert!(scheme.unwrap_key(&sk, &wrapped.bytes).is_err());
    }

    #[test]
    fn test_bind_mode_roundtrip() {
        let (pk_bytes, sk) = setup_keys();
        let scheme = MlKemScheme::new(MlKemWrapMode::BindSymmetricKey);
        let public_key = scheme.import_public_key(&pk_bytes).unwrap();
        let key = [0x5au8; 32];

        let (wrapped, _) = scheme.wrap(&public_key, &key).unwrap();
        // 1088 + 12 + 32 + 16(tag)
        assert_eq!(wrapped.len(), CIPHERTEXT_BYTES + NONCE_SIZE + 32 + 16);
        assert_eq!(scheme.unwrap_key(&sk, &wrapped.bytes).unwrap(), key);
    }

    #[test]
    fn test_bind_mode_wrong_key_fails() {
        let (pk_bytes, _) = setup_keys();
        let (_, wrong_sk) = setup_keys();
        let scheme = MlKemScheme::new(MlKemWrapMode::BindSymmetricKey);
        let public_key = scheme.import_public_key(&pk_bytes).unwrap();

        let wrapped = scheme.wrap_key(&public_key, &[1u8; 32]).unwrap();
        assert!(scheme.unwrap_key(&wrong_sk, &wrapped).is_err());
    }

    #[test]
    fn test_import_wrong_length_fails() {
        let err = MlKemScheme::default()
            .import_public_key(&[0u8; 100])
            .err()
            .unwrap();
        assert!(matches!(err, BenchError::KeyParse { scheme: SchemeId::MlKem, .. }));
    }

    #[test]
    fn test_ciphertext_uniqueness() {
        let (pk_bytes, _) = setup_keys();
        let scheme = MlKemScheme::default();
        let public_key = scheme.import_public_key(&pk_bytes).unwrap();
        let a = scheme.wrap_key(&public_key, &[0u8; 32]).unwrap();
        let b = scheme.wrap_key(&public_key, &[0u8; 32]).unwrap();
        assert_ne!(a, b);
    }
}
