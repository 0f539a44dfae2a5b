//! # Traditional Key-Wrapping Module
//!
//! This module contains the RSA-OAEP implementation of the `KeyExchangeScheme` trait.
//!
//! ---
//!
//! # 传统密钥包裹模块
//!
//! 本模块包含 RSA-OAEP 对 `KeyExchangeScheme` 特征的实现。

pub mod rsa;

// 重新导出，调用方可以直接使用 `traditional::RsaOaepScheme`。
pub use rsa::RsaOaepScheme;
