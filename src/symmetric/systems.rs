//! # Symmetric Cryptographic Systems Module
//!
//! Holds the symmetric cipher that encrypts the benchmark message. The key it
//! generates is what the asymmetric schemes wrap afterwards.
//!
//! ---
//!
//! # 对称加密系统模块
//!
//! 负责加密基准消息的对称算法。它生成的密钥随后交给非对称方案进行包裹。

pub mod aes_cbc;
