//! 定义了密钥包裹方案的核心 Trait。
use crate::contract::SchemeId;
use crate::error::Result;
use serde::Serialize;
use std::time::{Duration, Instant};

/// 单次包裹操作的耗时样本。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimingSample {
    pub scheme: SchemeId,
    pub duration: Duration,
}

impl TimingSample {
    pub fn new(scheme: SchemeId, duration: Duration) -> Self {
        Self { scheme, duration }
    }

    pub fn seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

/// 被某个方案包裹后的对称密钥产物。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedKey {
    pub scheme: SchemeId,
    pub bytes: Vec<u8>,
}

impl WrappedKey {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// `KeyExchangeScheme` 定义了“在收到的公钥下保护一个对称密钥”的统一接口。
///
/// RSA 通过 OAEP 直接加密密钥字节；ML-KEM 通过封装产生密文与共享秘密。
/// 编排器只依赖这个接口，不需要根据算法分支。
pub trait KeyExchangeScheme {
    /// 解析后的公钥类型
    type PublicKey;

    /// 方案标识
    const SCHEME: SchemeId;

    /// 从签发服务给出的编码字节导入公钥。
    fn import_public_key(&self, encoded: &[u8]) -> Result<Self::PublicKey>;

    /// 签发服务在 `key_size` 字段中声明的尺寸口径：
    /// RSA 为模数位数，ML-KEM 为编码后的字节数。
    fn nominal_key_size(&self, public_key: &Self::PublicKey, encoded: &[u8]) -> usize;

    /// 在公钥下包裹对称密钥，返回包裹产物的原始字节。
    fn wrap_key(&self, public_key: &Self::PublicKey, key: &[u8]) -> Result<Vec<u8>>;

    /// 计时版本的 [`wrap_key`](Self::wrap_key)：只测量包裹本身。
    fn wrap(&self, public_key: &Self::PublicKey, key: &[u8]) -> Result<(WrappedKey, TimingSample)> {
        let start = Instant::now();
        let bytes = self.wrap_key(public_key, key)?;
        let sample = TimingSample::new(Self::SCHEME, start.elapsed());
        Ok((
            WrappedKey {
                scheme: Self::SCHEME,
                bytes,
            },
            sample,
        ))
    }
}
