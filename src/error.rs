//! Defines the custom error type for the `kem-bench` crate.

use crate::contract::SchemeId;
use thiserror::Error;

/// The main error type for the `kem-bench` crate.
///
/// 每一个变体都只会中止当前这一轮基准（tick），不会终止进程。
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("transport error ({scheme}): {message}")]
    Transport { scheme: SchemeId, message: String },

    #[error("decode error ({scheme}): {message}")]
    Decode { scheme: SchemeId, message: String },

    #[error("invalid {scheme} public key: {message}")]
    KeyParse { scheme: SchemeId, message: String },

    #[error("payload of {len} bytes exceeds {scheme} capacity of {max} bytes")]
    PayloadTooLarge {
        scheme: SchemeId,
        len: usize,
        max: usize,
    },

    #[error("{scheme} wrap failed: {message}")]
    Wrap { scheme: SchemeId, message: String },

    #[error("secure random source unavailable: {0}")]
    RandomSourceExhausted(#[from] rand_core::OsError),

    #[error("cipher initialisation failed: {0}")]
    CipherInit(String),

    #[error("decryption failed: {0}")]
    Decrypt(String),

    #[error("{scheme} key generation failed: {message}")]
    KeyGeneration { scheme: SchemeId, message: String },

    #[error("metrics registry error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

impl BenchError {
    /// 出错的算法（若与具体算法相关）。
    pub fn scheme(&self) -> Option<SchemeId> {
        match self {
            BenchError::Transport { scheme, .. }
            | BenchError::Decode { scheme, .. }
            | BenchError::KeyParse { scheme, .. }
            | BenchError::PayloadTooLarge { scheme, .. }
            | BenchError::Wrap { scheme, .. }
            | BenchError::KeyGeneration { scheme, .. } => Some(*scheme),
            _ => None,
        }
    }

    pub(crate) fn transport(scheme: SchemeId, message: impl Into<String>) -> Self {
        BenchError::Transport {
            scheme,
            message: message.into(),
        }
    }

    pub(crate) fn decode(scheme: SchemeId, message: impl Into<String>) -> Self {
        BenchError::Decode {
            scheme,
            message: message.into(),
        }
    }

    pub(crate) fn key_parse(scheme: SchemeId, message: impl Into<String>) -> Self {
        BenchError::KeyParse {
            scheme,
            message: message.into(),
        }
    }

    pub(crate) fn wrap(scheme: SchemeId, message: impl Into<String>) -> Self {
        BenchError::Wrap {
            scheme,
            message: message.into(),
        }
    }
}

pub type Result<T, E = BenchError> = std::result::Result<T, E>;
