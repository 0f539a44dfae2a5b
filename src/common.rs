//! 通用模块：配置与日志

pub mod config;
pub mod logging;

pub use self::config::{BenchConfig, EndpointConfig, KeySourceKind};
