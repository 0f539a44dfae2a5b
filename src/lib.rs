//! # kem-bench: RSA-2048 与 ML-KEM-768 的混合加密基准
//!
//! `kem-bench` 周期性地执行一轮混合加密流程，并比较传统公钥加密与后量子密钥封装：
//!
//! 1. 从两个密钥签发服务各获取一把新公钥（RSA SubjectPublicKeyInfo DER / Kyber-768 原始字节）；
//! 2. 用新生成的 32 字节密钥与 16 字节 IV 以 AES-256-CBC 加密一条消息；
//! 3. 分别用 RSA-OAEP(SHA-256) 与 ML-KEM-768 封装“包裹”该对称密钥，并只测量包裹本身的耗时；
//! 4. 更新运行平均值与三个“后量子 / 传统”比值，推送给指标接收端。
//!
//! ## Core Concepts
//!
//! - **`BenchmarkRunner`**: 编排器状态机，每次 `run_once` 执行一轮。
//! - **`KeyExchangeScheme`**: 统一的密钥包裹接口，RSA 与 ML-KEM 各实现一次。
//! - **`KeySource`**: 公钥的来源，HTTP 服务或进程内签发。
//! - **`MetricsAggregator`**: 运行统计、比值与快照发布。
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kem_bench::client::LocalKeySource;
//! use kem_bench::metrics::MetricsAggregator;
//! use kem_bench::runner::BenchmarkRunner;
//!
//! fn main() -> kem_bench::Result<()> {
//!     let mut runner = BenchmarkRunner::new(
//!         LocalKeySource::default(),
//!         vec!["hello".to_string()],
//!         MetricsAggregator::default(),
//!     )?;
//!     let report = runner.run_once().map_err(|e| e.source)?;
//!     println!("{:?}", report.snapshot.wrapped_key_size_ratio);
//!     Ok(())
//! }
//! ```

pub mod asymmetric;
pub mod client;
pub mod common;
pub mod contract;
pub mod error;
pub mod metrics;
pub mod runner;
pub mod server;
pub mod symmetric;

pub use crate::asymmetric::{KeyExchangeScheme, MlKemScheme, MlKemWrapMode, RsaOaepScheme};
pub use crate::client::{KeySource, LocalKeySource, PublicKeyFetcher};
#[cfg(feature = "http")]
pub use crate::client::HttpKeySource;
pub use crate::common::BenchConfig;
pub use crate::contract::{PublicKeyResponse, SchemeId};
pub use crate::error::{BenchError, Result};
pub use crate::metrics::{MetricsAggregator, PrometheusSink, SnapshotHandle, StatisticsSnapshot};
pub use crate::runner::{BenchmarkRunner, RunnerState, Scheduler, TickError, TickReport};

/// 当前库的版本号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
