//! # Post-Quantum Key-Encapsulation Module
//!
//! This module contains the ML-KEM-768 (Kyber-768) implementation of the
//! `KeyExchangeScheme` trait.
//!
//! ---
//!
//! # 后量子密钥封装模块
//!
//! 本模块包含 ML-KEM-768（Kyber-768）对 `KeyExchangeScheme` 特征的实现。

pub mod kyber;

// 重新导出，调用方可以直接使用 `post_quantum::MlKemScheme`。
pub use kyber::{MlKemScheme, MlKemWrapMode};
