//! Key-issuing side: the request/response logic of the RSA and ML-KEM key services.
//!
//! 仅包含“生成密钥并构造响应”的逻辑，不包含 HTTP 路由。

pub mod issuer;

pub use issuer::{IssuedKey, KeyIssuer, MlKemKeyIssuer, RsaKeyIssuer};
