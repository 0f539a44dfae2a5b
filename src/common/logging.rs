//! 日志初始化
use crate::error::{BenchError, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// 安装全局 `tracing` 订阅者。
///
/// `RUST_LOG` 优先于 `default_filter`。重复初始化会返回 `Config` 错误，
/// 调用方（例如测试）可以忽略它。
pub fn init(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| BenchError::Config(format!("无效的日志过滤器 {:?}: {}", default_filter, e)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .try_init()
        .map_err(|e| BenchError::Config(format!("日志系统初始化失败: {}", e)))
}
