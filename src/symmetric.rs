//! 对称加密核心模块

pub mod systems;

pub use systems::aes_cbc::{SymmetricCiphertext, SymmetricEncryptor, SymmetricKey};
