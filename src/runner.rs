//! 基准编排器。
//!
//! `BenchmarkRunner` 每次 `run_once` 执行一轮完整的混合加密流程：
//! 获取两把公钥 → AES-256-CBC 加密消息 → 分别用 RSA-OAEP 与 ML-KEM 包裹对称密钥 → 记录指标。
//! 任一步骤失败都会中止本轮并回到 `Idle`，本轮不记录任何数据。

pub mod scheduler;

use crate::asymmetric::{KeyExchangeScheme, MlKemScheme, MlKemWrapMode, RsaOaepScheme, WrappedKey};
use crate::client::provider::{KeySource, PublicKeyFetcher};
use crate::contract::SchemeId;
use crate::error::{BenchError, Result};
use crate::metrics::{
    MetricsAggregator, PhaseTimings, SchemeMeasurement, SnapshotHandle, StatisticsSnapshot,
    TickMeasurements,
};
use crate::symmetric::{SymmetricCiphertext, SymmetricEncryptor};
use std::fmt;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, info_span};

pub use scheduler::{RunSummary, Scheduler};

/// 编排器所处的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    FetchingKeys,
    Encrypting,
    WrappingKeys,
    Recording,
}

impl fmt::Display for RunnerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunnerState::Idle => "idle",
            RunnerState::FetchingKeys => "fetching_keys",
            RunnerState::Encrypting => "encrypting",
            RunnerState::WrappingKeys => "wrapping_keys",
            RunnerState::Recording => "recording",
        })
    }
}

/// 一轮基准在某个阶段失败。
#[derive(Debug, Error)]
#[error("tick {tick} aborted while {phase}: {source}")]
pub struct TickError {
    pub tick: u64,
    pub phase: RunnerState,
    #[source]
    pub source: BenchError,
}

/// 一轮基准产生的密文与两份包裹产物；随本轮结束而丢弃。
#[derive(Debug, Clone)]
pub struct EncryptedEnvelope {
    pub rsa_wrapped: WrappedKey,
    pub ml_kem_wrapped: WrappedKey,
    pub ciphertext: SymmetricCiphertext,
}

/// 成功完成的一轮
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u64,
    pub message_index: usize,
    pub measurements: TickMeasurements,
    pub envelope: EncryptedEnvelope,
    pub snapshot: StatisticsSnapshot,
}

pub struct BenchmarkRunner<S> {
    fetcher: PublicKeyFetcher<S>,
    rsa: RsaOaepScheme,
    ml_kem: MlKemScheme,
    encryptor: SymmetricEncryptor,
    messages: Vec<String>,
    aggregator: MetricsAggregator,
    state: RunnerState,
    tick: u64,
}

impl<S: KeySource> BenchmarkRunner<S> {
    /// 创建编排器。消息集合不能为空。
    pub fn new(source: S, messages: Vec<String>, aggregator: MetricsAggregator) -> Result<Self> {
        if messages.is_empty() {
            return Err(BenchError::Config("消息集合不能为空".to_string()));
        }
        Ok(Self {
            fetcher: PublicKeyFetcher::new(source),
            rsa: RsaOaepScheme::new(),
            ml_kem: MlKemScheme::default(),
            encryptor: SymmetricEncryptor::new(),
            messages,
            aggregator,
            state: RunnerState::Idle,
            tick: 0,
        })
    }

    pub fn with_ml_kem_mode(mut self, mode: MlKemWrapMode) -> Self {
        self.ml_kem = MlKemScheme::new(mode);
        self
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// 已经开始过的 tick 数（包括失败的）。
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn aggregator(&self) -> &MetricsAggregator {
        &self.aggregator
    }

    pub fn snapshot_handle(&self) -> SnapshotHandle {
        self.aggregator.handle()
    }

    pub fn fetcher(&self) -> &PublicKeyFetcher<S> {
        &self.fetcher
    }

    /// 执行一轮基准。
    ///
    /// 返回后状态总是 `Idle`。失败时返回出错的阶段，统计数据保持不变。
    pub fn run_once(&mut self) -> std::result::Result<TickReport, TickError> {
        self.tick += 1;
        let tick = self.tick;
        let span = info_span!("tick", tick);
        let _guard = span.enter();

        self.aggregator.record_attempt();
        let result = self.execute(tick);
        self.state = RunnerState::Idle;

        match &result {
            Ok(report) => info!(
                fetch_rsa = ?report.measurements.phases.fetch_rsa,
                fetch_ml_kem = ?report.measurements.phases.fetch_ml_kem,
                key_generation = ?report.measurements.phases.key_generation,
                encryption = ?report.measurements.phases.encryption,
                rsa_wrap = ?report.measurements.rsa.sample.duration,
                ml_kem_wrap = ?report.measurements.ml_kem.sample.duration,
                total = ?report.measurements.phases.total,
                duration_ratio = ?report.snapshot.duration_ratio,
                "tick completed"
            ),
            Err(e) => error!(
                phase = %e.phase,
                scheme = e.source.scheme().map(SchemeId::label),
                error = %e.source,
                "tick aborted"
            ),
        }
        result
    }

    fn execute(&mut self, tick: u64) -> std::result::Result<TickReport, TickError> {
        let fail = |phase: RunnerState| move |source: BenchError| TickError { tick, phase, source };

        let message_index = (tick % self.messages.len() as u64) as usize;
        let started = Instant::now();
        let mut phases = PhaseTimings::default();

        self.state = RunnerState::FetchingKeys;
        let mark = Instant::now();
        let rsa_key = self
            .fetcher
            .fetch(&self.rsa)
            .map_err(fail(RunnerState::FetchingKeys))?;
        phases.fetch_rsa = mark.elapsed();
        let mark = Instant::now();
        let ml_kem_key = self
            .fetcher
            .fetch(&self.ml_kem)
            .map_err(fail(RunnerState::FetchingKeys))?;
        phases.fetch_ml_kem = mark.elapsed();
        debug!(
            rsa_public_key = rsa_key.material.len(),
            ml_kem_public_key = ml_kem_key.material.len(),
            "fetched public keys"
        );

        self.state = RunnerState::Encrypting;
        let mark = Instant::now();
        let symmetric_key = self
            .encryptor
            .generate_key()
            .map_err(fail(RunnerState::Encrypting))?;
        phases.key_generation = mark.elapsed();
        let mark = Instant::now();
        let ciphertext = self
            .encryptor
            .encrypt(&symmetric_key, self.messages[message_index].as_bytes())
            .map_err(fail(RunnerState::Encrypting))?;
        phases.encryption = mark.elapsed();

        self.state = RunnerState::WrappingKeys;
        let (rsa_wrapped, rsa_sample) = self
            .rsa
            .wrap(&rsa_key.key, symmetric_key.as_bytes())
            .map_err(fail(RunnerState::WrappingKeys))?;
        let (ml_kem_wrapped, ml_kem_sample) = self
            .ml_kem
            .wrap(&ml_kem_key.key, symmetric_key.as_bytes())
            .map_err(fail(RunnerState::WrappingKeys))?;
        drop(symmetric_key);
        phases.total = started.elapsed();

        self.state = RunnerState::Recording;
        let measurements = TickMeasurements {
            tick,
            rsa: SchemeMeasurement {
                public_key_len: rsa_key.material.len(),
                wrapped_len: rsa_wrapped.len(),
                sample: rsa_sample,
            },
            ml_kem: SchemeMeasurement {
                public_key_len: ml_kem_key.material.len(),
                wrapped_len: ml_kem_wrapped.len(),
                sample: ml_kem_sample,
            },
            phases,
            ciphertext_len: ciphertext.ciphertext.len(),
            iv_len: ciphertext.iv.len(),
        };
        let snapshot = self.aggregator.record(&measurements).clone();

        Ok(TickReport {
            tick,
            message_index,
            measurements,
            envelope: EncryptedEnvelope {
                rsa_wrapped,
                ml_kem_wrapped,
                ciphertext,
            },
            snapshot,
        })
    }
}
