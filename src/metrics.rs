//! 运行统计与对比指标。
//!
//! `MetricsAggregator` 在每个完整的 tick 之后更新累计值、重新计算平均值与三个
//! “后量子 / 传统”比值，并把快照推送给外部指标接收端。

pub mod exporter;
pub mod sink;

use crate::asymmetric::TimingSample;
use crate::contract::SchemeId;
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub use exporter::{IssuerMetrics, PrometheusSink};
pub use sink::{MetricsSink, NoopSink};

/// 单个方案的累计值
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemeTotals {
    pub total: Duration,
    pub count: u64,
}

impl SchemeTotals {
    /// 累计耗时 / 累计次数。以整数纳秒计算，相同样本的平均值不会漂移。
    pub fn average(&self) -> Option<Duration> {
        if self.count == 0 {
            return None;
        }
        let nanos = self.total.as_nanos() / u128::from(self.count);
        Some(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
    }
}

/// 进程生命周期内的运行统计，不提供重置操作。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningStatistics {
    rsa: SchemeTotals,
    ml_kem: SchemeTotals,
}

impl RunningStatistics {
    pub fn totals(&self, scheme: SchemeId) -> &SchemeTotals {
        match scheme {
            SchemeId::Rsa => &self.rsa,
            SchemeId::MlKem => &self.ml_kem,
        }
    }

    fn totals_mut(&mut self, scheme: SchemeId) -> &mut SchemeTotals {
        match scheme {
            SchemeId::Rsa => &mut self.rsa,
            SchemeId::MlKem => &mut self.ml_kem,
        }
    }

    pub fn count(&self, scheme: SchemeId) -> u64 {
        self.totals(scheme).count
    }

    pub fn average(&self, scheme: SchemeId) -> Option<Duration> {
        self.totals(scheme).average()
    }

    fn record(&mut self, sample: &TimingSample) {
        let totals = self.totals_mut(sample.scheme);
        totals.total += sample.duration;
        totals.count += 1;
    }
}

/// 一个方案在一个 tick 内的测量值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchemeMeasurement {
    pub public_key_len: usize,
    pub wrapped_len: usize,
    pub sample: TimingSample,
}

/// 一个 tick 内各阶段的耗时。包裹耗时在 `SchemeMeasurement::sample` 中。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseTimings {
    pub fetch_rsa: Duration,
    pub fetch_ml_kem: Duration,
    pub key_generation: Duration,
    pub encryption: Duration,
    /// 从 tick 开始到进入记录阶段，覆盖以上各阶段与两次包裹。
    pub total: Duration,
}

/// 一个 tick 的完整测量值；只有全部四项都存在时才会构造。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickMeasurements {
    pub tick: u64,
    pub rsa: SchemeMeasurement,
    pub ml_kem: SchemeMeasurement,
    pub phases: PhaseTimings,
    pub ciphertext_len: usize,
    pub iv_len: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemeSnapshot {
    pub public_key_size_bytes: usize,
    pub wrapped_key_size_bytes: usize,
    pub wrap_duration_seconds: f64,
    pub wrap_duration_avg_seconds: f64,
    pub samples: u64,
}

/// 最近一个完整 tick 的阶段耗时（秒）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhaseSnapshot {
    pub fetch_rsa_seconds: f64,
    pub fetch_ml_kem_seconds: f64,
    pub key_generation_seconds: f64,
    pub encryption_seconds: f64,
    pub tick_seconds: f64,
}

impl From<&PhaseTimings> for PhaseSnapshot {
    fn from(p: &PhaseTimings) -> Self {
        Self {
            fetch_rsa_seconds: p.fetch_rsa.as_secs_f64(),
            fetch_ml_kem_seconds: p.fetch_ml_kem.as_secs_f64(),
            key_generation_seconds: p.key_generation.as_secs_f64(),
            encryption_seconds: p.encryption.as_secs_f64(),
            tick_seconds: p.total.as_secs_f64(),
        }
    }
}

/// 对外呈现的时点快照 + 运行平均值。每个 tick 覆盖写入，不追加。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatisticsSnapshot {
    pub attempts: u64,
    pub last_tick: Option<u64>,
    pub rsa: SchemeSnapshot,
    pub ml_kem: SchemeSnapshot,
    pub phases: PhaseSnapshot,
    /// ML-KEM / RSA 包裹耗时
    pub duration_ratio: Option<f64>,
    /// ML-KEM / RSA 包裹产物大小
    pub wrapped_key_size_ratio: Option<f64>,
    /// ML-KEM / RSA 公钥大小
    pub public_key_size_ratio: Option<f64>,
    pub ciphertext_size_bytes: usize,
    pub iv_size_bytes: usize,
    pub updated_at: Option<DateTime<Utc>>,
}

/// 供其他线程无锁读取最新快照的句柄。
#[derive(Clone)]
pub struct SnapshotHandle(Arc<ArcSwap<StatisticsSnapshot>>);

impl SnapshotHandle {
    pub fn load(&self) -> Arc<StatisticsSnapshot> {
        self.0.load_full()
    }
}

/// 分母为零（或非正）时不产生比值，调用方保留上一次的值。
fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 {
        Some(numerator / denominator)
    } else {
        None
    }
}

/// 聚合器：持有 `RunningStatistics`，由编排器独占。
pub struct MetricsAggregator {
    stats: RunningStatistics,
    current: StatisticsSnapshot,
    published: Arc<ArcSwap<StatisticsSnapshot>>,
    sink: Box<dyn MetricsSink>,
}

impl MetricsAggregator {
    pub fn new(sink: Box<dyn MetricsSink>) -> Self {
        Self {
            stats: RunningStatistics::default(),
            current: StatisticsSnapshot::default(),
            published: Arc::new(ArcSwap::from_pointee(StatisticsSnapshot::default())),
            sink,
        }
    }

    pub fn statistics(&self) -> &RunningStatistics {
        &self.stats
    }

    pub fn snapshot(&self) -> &StatisticsSnapshot {
        &self.current
    }

    pub fn handle(&self) -> SnapshotHandle {
        SnapshotHandle(Arc::clone(&self.published))
    }

    /// 每个 tick 开始时调用，无论该 tick 最终是否成功。
    pub fn record_attempt(&mut self) {
        self.current.attempts += 1;
        self.sink.record_attempt();
        self.publish();
    }

    /// 记录一个完整 tick 的测量值。
    pub fn record(&mut self, tick: &TickMeasurements) -> &StatisticsSnapshot {
        self.stats.record(&tick.rsa.sample);
        self.stats.record(&tick.ml_kem.sample);

        self.current.rsa = self.scheme_snapshot(&tick.rsa);
        self.current.ml_kem = self.scheme_snapshot(&tick.ml_kem);
        self.current.phases = PhaseSnapshot::from(&tick.phases);

        let previous = (
            self.current.duration_ratio,
            self.current.wrapped_key_size_ratio,
            self.current.public_key_size_ratio,
        );
        self.current.duration_ratio = ratio(
            tick.ml_kem.sample.seconds(),
            tick.rsa.sample.seconds(),
        )
        .or(previous.0);
        self.current.wrapped_key_size_ratio = ratio(
            tick.ml_kem.wrapped_len as f64,
            tick.rsa.wrapped_len as f64,
        )
        .or(previous.1);
        self.current.public_key_size_ratio = ratio(
            tick.ml_kem.public_key_len as f64,
            tick.rsa.public_key_len as f64,
        )
        .or(previous.2);

        self.current.last_tick = Some(tick.tick);
        self.current.ciphertext_size_bytes = tick.ciphertext_len;
        self.current.iv_size_bytes = tick.iv_len;
        self.current.updated_at = Some(Utc::now());

        self.sink.publish(&self.current);
        self.publish();
        &self.current
    }

    fn scheme_snapshot(&self, m: &SchemeMeasurement) -> SchemeSnapshot {
        let totals = self.stats.totals(m.sample.scheme);
        SchemeSnapshot {
            public_key_size_bytes: m.public_key_len,
            wrapped_key_size_bytes: m.wrapped_len,
            wrap_duration_seconds: m.sample.seconds(),
            wrap_duration_avg_seconds: totals.average().unwrap_or_default().as_secs_f64(),
            samples: totals.count,
        }
    }

    fn publish(&self) {
        self.published.store(Arc::new(self.current.clone()));
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new(Box::new(NoopSink))
    }
}
