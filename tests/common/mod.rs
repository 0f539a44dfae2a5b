//!
//! 集成测试的通用辅助函数
//!
#![allow(dead_code)]

use base64::{Engine, engine::general_purpose::STANDARD};
use kem_bench::asymmetric::{MlKemScheme, RsaOaepScheme};
use kem_bench::client::KeySource;
use kem_bench::contract::{PublicKeyResponse, SchemeId};
use kem_bench::error::Result;
use pqcrypto_kyber::kyber768;
use rsa::RsaPrivateKey;
use std::sync::{Mutex, OnceLock};

/// 整个测试进程共享一把 RSA-2048 密钥，避免重复生成。
pub fn rsa_keypair() -> &'static (RsaPrivateKey, Vec<u8>) {
    static KEYPAIR: OnceLock<(RsaPrivateKey, Vec<u8>)> = OnceLock::new();
    KEYPAIR.get_or_init(|| RsaOaepScheme::generate_keypair(2048).unwrap())
}

pub fn rsa_payload() -> String {
    let (_, der) = rsa_keypair();
    serde_json::to_string(&PublicKeyResponse {
        public_key: STANDARD.encode(der),
        key_size: 2048,
        algorithm: None,
    })
    .unwrap()
}

/// 保留私钥的密钥源：测试可以解开每一轮的包裹产物。
///
/// RSA 每轮返回同一把共享公钥；ML-KEM 每轮生成新的密钥对并记住最近一次的私钥。
#[derive(Default)]
pub struct KeyringSource {
    ml_kem_secret: Mutex<Option<kyber768::SecretKey>>,
    ml_kem_override: Mutex<Option<String>>,
}

impl KeyringSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rsa_private_key(&self) -> &'static RsaPrivateKey {
        &rsa_keypair().0
    }

    /// 取出最近一次签发的 ML-KEM 私钥。
    pub fn take_ml_kem_secret(&self) -> kyber768::SecretKey {
        self.ml_kem_secret.lock().unwrap().take().unwrap()
    }

    /// 之后的 ML-KEM 请求返回 `body`，传入 `None` 恢复正常签发。
    pub fn override_ml_kem(&self, body: Option<&str>) {
        *self.ml_kem_override.lock().unwrap() = body.map(String::from);
    }
}

impl KeySource for KeyringSource {
    fn fetch(&self, scheme: SchemeId) -> Result<String> {
        match scheme {
            SchemeId::Rsa => Ok(rsa_payload()),
            SchemeId::MlKem => {
                if let Some(body) = self.ml_kem_override.lock().unwrap().clone() {
                    return Ok(body);
                }
                let (public_key, secret_key) = MlKemScheme::generate_keypair();
                *self.ml_kem_secret.lock().unwrap() = Some(secret_key);
                Ok(serde_json::to_string(&PublicKeyResponse {
                    public_key: STANDARD.encode(&public_key),
                    key_size: public_key.len(),
                    algorithm: Some(SchemeId::MlKem.algorithm_name().to_string()),
                })
                .unwrap())
            }
        }
    }
}
