//! Prometheus exposition of the benchmark snapshot and issuer timings.
//!
//! 每个 `PrometheusSink` 持有自己的 `Registry`，不使用进程级全局注册表，
//! 因此测试之间互不干扰。

use crate::contract::SchemeId;
use crate::error::Result;
use crate::metrics::sink::MetricsSink;
use crate::metrics::StatisticsSnapshot;
use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder,
};
use std::time::Duration;

const RSA_BUCKETS: [f64; 9] = [0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0];
const MLKEM_BUCKETS: [f64; 9] = [0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1];

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<Gauge> {
    let g = Gauge::new(name, help)?;
    registry.register(Box::new(g.clone()))?;
    Ok(g)
}

/// Benchmark client gauges, one set per process.
#[derive(Clone)]
pub struct PrometheusSink {
    registry: Registry,
    operations: IntCounter,
    rsa_wrap_seconds: Gauge,
    mlkem_wrap_seconds: Gauge,
    rsa_wrap_avg_seconds: Gauge,
    mlkem_wrap_avg_seconds: Gauge,
    rsa_wrapped_key_bytes: Gauge,
    mlkem_wrapped_key_bytes: Gauge,
    rsa_public_key_bytes: Gauge,
    mlkem_public_key_bytes: Gauge,
    ciphertext_bytes: Gauge,
    iv_bytes: Gauge,
    rsa_fetch_seconds: Gauge,
    mlkem_fetch_seconds: Gauge,
    aes_key_generation_seconds: Gauge,
    aes_encryption_seconds: Gauge,
    tick_seconds: Gauge,
    duration_ratio: Gauge,
    wrapped_key_size_ratio: Gauge,
    public_key_size_ratio: Gauge,
}

impl PrometheusSink {
    pub fn new() -> Result<Self> {
        Self::with_registry(Registry::new())
    }

    pub fn with_registry(registry: Registry) -> Result<Self> {
        let operations = IntCounter::new(
            "client_encryption_operations_total",
            "Number of benchmark ticks started",
        )?;
        registry.register(Box::new(operations.clone()))?;

        Ok(Self {
            rsa_wrap_seconds: gauge(
                &registry,
                "client_rsa_encryption_duration_seconds",
                "Time spent wrapping the AES key with RSA-OAEP in the latest tick",
            )?,
            mlkem_wrap_seconds: gauge(
                &registry,
                "client_mlkem_encapsulation_duration_seconds",
                "Time spent on ML-KEM encapsulation in the latest tick",
            )?,
            rsa_wrap_avg_seconds: gauge(
                &registry,
                "client_rsa_encryption_duration_avg_seconds",
                "Running average RSA wrap time",
            )?,
            mlkem_wrap_avg_seconds: gauge(
                &registry,
                "client_mlkem_encapsulation_duration_avg_seconds",
                "Running average ML-KEM wrap time",
            )?,
            rsa_wrapped_key_bytes: gauge(
                &registry,
                "client_rsa_encrypted_key_size_bytes",
                "Size of the RSA wrapped key",
            )?,
            mlkem_wrapped_key_bytes: gauge(
                &registry,
                "client_mlkem_encrypted_key_size_bytes",
                "Size of the ML-KEM wrap artifact",
            )?,
            rsa_public_key_bytes: gauge(
                &registry,
                "client_rsa_public_key_size_bytes",
                "Decoded size of the RSA public key",
            )?,
            mlkem_public_key_bytes: gauge(
                &registry,
                "client_mlkem_public_key_size_bytes",
                "Decoded size of the ML-KEM public key",
            )?,
            ciphertext_bytes: gauge(
                &registry,
                "client_aes_ciphertext_size_bytes",
                "Size of the AES-CBC ciphertext",
            )?,
            iv_bytes: gauge(&registry, "client_aes_iv_size_bytes", "Size of the AES-CBC IV")?,
            rsa_fetch_seconds: gauge(
                &registry,
                "client_rsa_public_key_fetch_duration_seconds",
                "Time spent fetching and importing the RSA public key",
            )?,
            mlkem_fetch_seconds: gauge(
                &registry,
                "client_mlkem_public_key_fetch_duration_seconds",
                "Time spent fetching and importing the ML-KEM public key",
            )?,
            aes_key_generation_seconds: gauge(
                &registry,
                "client_aes_key_generation_duration_seconds",
                "Time spent generating the AES key",
            )?,
            aes_encryption_seconds: gauge(
                &registry,
                "client_aes_encryption_duration_seconds",
                "Time spent encrypting the message with AES-CBC",
            )?,
            tick_seconds: gauge(
                &registry,
                "client_tick_duration_seconds",
                "Wall time of the latest complete tick",
            )?,
            duration_ratio: gauge(
                &registry,
                "client_encryption_duration_ratio",
                "ML-KEM wrap time divided by RSA wrap time",
            )?,
            wrapped_key_size_ratio: gauge(
                &registry,
                "client_encrypted_key_size_ratio",
                "ML-KEM wrap artifact size divided by RSA wrapped key size",
            )?,
            public_key_size_ratio: gauge(
                &registry,
                "client_public_key_size_ratio",
                "ML-KEM public key size divided by RSA public key size",
            )?,
            operations,
            registry,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Dump metrics in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let families = self.registry.gather();
        let mut buf = Vec::new();
        if TextEncoder::new().encode(&families, &mut buf).is_ok() {
            String::from_utf8(buf).unwrap_or_default()
        } else {
            String::new()
        }
    }
}

impl MetricsSink for PrometheusSink {
    fn record_attempt(&mut self) {
        self.operations.inc();
    }

    fn publish(&mut self, s: &StatisticsSnapshot) {
        self.rsa_wrap_seconds.set(s.rsa.wrap_duration_seconds);
        self.mlkem_wrap_seconds.set(s.ml_kem.wrap_duration_seconds);
        self.rsa_wrap_avg_seconds.set(s.rsa.wrap_duration_avg_seconds);
        self.mlkem_wrap_avg_seconds.set(s.ml_kem.wrap_duration_avg_seconds);
        self.rsa_wrapped_key_bytes.set(s.rsa.wrapped_key_size_bytes as f64);
        self.mlkem_wrapped_key_bytes.set(s.ml_kem.wrapped_key_size_bytes as f64);
        self.rsa_public_key_bytes.set(s.rsa.public_key_size_bytes as f64);
        self.mlkem_public_key_bytes.set(s.ml_kem.public_key_size_bytes as f64);
        self.ciphertext_bytes.set(s.ciphertext_size_bytes as f64);
        self.iv_bytes.set(s.iv_size_bytes as f64);
        self.rsa_fetch_seconds.set(s.phases.fetch_rsa_seconds);
        self.mlkem_fetch_seconds.set(s.phases.fetch_ml_kem_seconds);
        self.aes_key_generation_seconds.set(s.phases.key_generation_seconds);
        self.aes_encryption_seconds.set(s.phases.encryption_seconds);
        self.tick_seconds.set(s.phases.tick_seconds);
        // 比值缺失时保留 gauge 的旧值
        if let Some(r) = s.duration_ratio {
            self.duration_ratio.set(r);
        }
        if let Some(r) = s.wrapped_key_size_ratio {
            self.wrapped_key_size_ratio.set(r);
        }
        if let Some(r) = s.public_key_size_ratio {
            self.public_key_size_ratio.set(r);
        }
    }
}

/// 签发端的密钥生成耗时与请求计数。
#[derive(Clone)]
pub struct IssuerMetrics {
    last_generation: Gauge,
    generation: Histogram,
    requests: IntCounter,
}

impl IssuerMetrics {
    pub fn register(registry: &Registry, scheme: SchemeId) -> Result<Self> {
        let (prefix, label, buckets) = match scheme {
            SchemeId::Rsa => ("rsa_server", "RSA", RSA_BUCKETS),
            SchemeId::MlKem => ("mlkem_server", "ML-KEM", MLKEM_BUCKETS),
        };

        let last_generation = gauge(
            registry,
            &format!("{prefix}_key_generation_seconds"),
            &format!("Time taken to generate the latest {label} key pair"),
        )?;
        let generation = Histogram::with_opts(
            HistogramOpts::new(
                format!("{prefix}_key_generation_duration_seconds"),
                format!("Distribution of {label} key generation times"),
            )
            .buckets(buckets.to_vec()),
        )?;
        registry.register(Box::new(generation.clone()))?;
        let requests = IntCounter::new(
            format!("{prefix}_public_key_requests_total"),
            format!("Number of {label} public key requests served"),
        )?;
        registry.register(Box::new(requests.clone()))?;

        Ok(Self {
            last_generation,
            generation,
            requests,
        })
    }

    pub fn observe(&self, generation_time: Duration) {
        let secs = generation_time.as_secs_f64();
        self.requests.inc();
        self.last_generation.set(secs);
        self.generation.observe(secs);
    }

    pub fn requests(&self) -> u64 {
        self.requests.get()
    }
}
