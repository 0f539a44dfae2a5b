//! 算法系统集合
//!
//! 包含传统（RSA-OAEP）与后量子（ML-KEM）两种密钥包裹实现
pub mod post_quantum;
pub mod traditional;
