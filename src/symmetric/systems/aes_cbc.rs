//! AES-256-CBC 对称加密实现（PKCS#7 填充）
use crate::error::{BenchError, Result};
use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand_core::{OsRng, TryRngCore};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

pub const KEY_SIZE: usize = 32;
pub const IV_SIZE: usize = 16;

/// 每轮基准新生成的对称密钥，离开作用域时自动擦除。
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for SymmetricKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// 不在日志中输出密钥内容
impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

/// 对称加密结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymmetricCiphertext {
    pub ciphertext: Vec<u8>,
    pub iv: [u8; IV_SIZE],
}

/// AES-256-CBC 对称加密器
#[derive(Debug, Clone, Copy, Default)]
pub struct SymmetricEncryptor;

impl SymmetricEncryptor {
    pub fn new() -> Self {
        Self
    }

    /// 从操作系统随机源生成一个新的密钥。
    pub fn generate_key(&self) -> Result<SymmetricKey> {
        let mut key_bytes = [0u8; KEY_SIZE];
        OsRng.try_fill_bytes(&mut key_bytes)?;
        let key = SymmetricKey(key_bytes);
        key_bytes.zeroize();
        Ok(key)
    }

    fn generate_iv(&self) -> Result<[u8; IV_SIZE]> {
        let mut iv = [0u8; IV_SIZE];
        OsRng.try_fill_bytes(&mut iv)?;
        Ok(iv)
    }

    /// 使用随机 IV 加密任意长度的明文。
    pub fn encrypt(&self, key: &SymmetricKey, plaintext: &[u8]) -> Result<SymmetricCiphertext> {
        let iv = self.generate_iv()?;
        let ciphertext = self.encrypt_with_iv(key.as_bytes(), &iv, plaintext)?;
        Ok(SymmetricCiphertext { ciphertext, iv })
    }

    /// 使用给定的密钥与 IV 加密。
    pub fn encrypt_with_iv(&self, key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = Aes256CbcEnc::new_from_slices(key, iv).map_err(|_| {
            BenchError::CipherInit(format!(
                "Invalid key/IV size: expected {}/{}, got {}/{}",
                KEY_SIZE,
                IV_SIZE,
                key.len(),
                iv.len()
            ))
        })?;
        Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
    }

    /// 解密并去除填充。
    pub fn decrypt(&self, key: &SymmetricKey, encrypted: &SymmetricCiphertext) -> Result<Vec<u8>> {
        let cipher = Aes256CbcDec::new_from_slices(key.as_bytes(), &encrypted.iv)
            .map_err(|e| BenchError::CipherInit(e.to_string()))?;
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(&encrypted.ciphertext)
            .map_err(|_| BenchError::Decrypt("invalid PKCS#7 padding".to_string()))
    }
}
