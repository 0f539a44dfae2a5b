//!
//! 端到端基准流程测试
//!
//! 验证从获取公钥、对称加密、密钥包裹到指标记录的完整一轮，
//! 以及失败轮次不污染统计、轮次之间不复用对称密钥等性质。
//!

mod common;

use common::KeyringSource;
use kem_bench::asymmetric::{MlKemScheme, MlKemWrapMode, RsaOaepScheme};
use kem_bench::client::LocalKeySource;
use kem_bench::contract::SchemeId;
use kem_bench::error::BenchError;
use kem_bench::metrics::{MetricsAggregator, PrometheusSink};
use kem_bench::runner::{BenchmarkRunner, RunnerState, Scheduler};
use kem_bench::server::RsaKeyIssuer;
use kem_bench::symmetric::{SymmetricEncryptor, SymmetricKey};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn messages() -> Vec<String> {
    ["alpha", "bravo", "charlie"].iter().map(|m| m.to_string()).collect()
}

fn keyring_runner(mode: MlKemWrapMode) -> (Arc<KeyringSource>, BenchmarkRunner<Arc<KeyringSource>>) {
    let source = Arc::new(KeyringSource::new());
    let runner = BenchmarkRunner::new(Arc::clone(&source), messages(), MetricsAggregator::default())
        .unwrap()
        .with_ml_kem_mode(mode);
    (source, runner)
}

#[test]
fn test_full_ticks_update_statistics() {
    let (_source, mut runner) = keyring_runner(MlKemWrapMode::EncapsulateOnly);
    let handle = runner.snapshot_handle();

    for expected in 1..=3u64 {
        let report = runner.run_once().unwrap();
        assert_eq!(report.tick, expected);
        let stats = runner.aggregator().statistics();
        assert_eq!(stats.count(SchemeId::Rsa), expected);
        assert_eq!(stats.count(SchemeId::MlKem), expected);
    }

    let snapshot = handle.load();
    assert_eq!(snapshot.attempts, 3);
    assert_eq!(snapshot.last_tick, Some(3));
    assert_eq!(snapshot.rsa.public_key_size_bytes, 294);
    assert_eq!(snapshot.rsa.wrapped_key_size_bytes, 256);
    assert_eq!(snapshot.ml_kem.public_key_size_bytes, 1184);
    assert_eq!(snapshot.ml_kem.wrapped_key_size_bytes, 1088);
    assert_eq!(snapshot.iv_size_bytes, 16);
    assert!((snapshot.wrapped_key_size_ratio.unwrap() - 4.25).abs() < 1e-12);
    assert!((snapshot.public_key_size_ratio.unwrap() - 1184.0 / 294.0).abs() < 1e-12);
    assert!(snapshot.rsa.wrap_duration_avg_seconds > 0.0);
    assert!(snapshot.updated_at.is_some());
}

#[test]
fn test_wrapped_keys_decrypt_the_message() {
    let (source, mut runner) = keyring_runner(MlKemWrapMode::BindSymmetricKey);
    let report = runner.run_once().unwrap();
    let envelope = &report.envelope;

    let via_rsa =
        RsaOaepScheme::unwrap_key(source.rsa_private_key(), &envelope.rsa_wrapped.bytes).unwrap();
    let via_ml_kem = MlKemScheme::new(MlKemWrapMode::BindSymmetricKey)
        .unwrap_key(&source.take_ml_kem_secret(), &envelope.ml_kem_wrapped.bytes)
        .unwrap();
    assert_eq!(via_rsa, via_ml_kem);

    let key = SymmetricKey::from_bytes(via_rsa.as_slice().try_into().unwrap());
    let plaintext = SymmetricEncryptor::new()
        .decrypt(&key, &envelope.ciphertext)
        .unwrap();
    assert_eq!(plaintext, messages()[report.message_index].as_bytes());
}

#[test]
fn test_no_symmetric_key_is_shared_across_ticks() {
    let (source, mut runner) = keyring_runner(MlKemWrapMode::EncapsulateOnly);
    let mut keys = HashSet::new();
    let mut ivs = HashSet::new();

    for _ in 0..5 {
        let report = runner.run_once().unwrap();
        let key = RsaOaepScheme::unwrap_key(source.rsa_private_key(), &report.envelope.rsa_wrapped.bytes)
            .unwrap();
        assert!(keys.insert(key));
        assert!(ivs.insert(report.envelope.ciphertext.iv));
    }
}

#[test]
fn test_malformed_key_payload_leaves_statistics_unchanged() {
    let (source, mut runner) = keyring_runner(MlKemWrapMode::EncapsulateOnly);
    runner.run_once().unwrap();
    let stats_before = runner.aggregator().statistics().clone();
    let ratio_before = runner.aggregator().snapshot().duration_ratio;

    source.override_ml_kem(Some(r#"{"public_key":"not*base64","key_size":1184}"#));
    let err = runner.run_once().unwrap_err();
    assert_eq!(err.tick, 2);
    assert_eq!(err.phase, RunnerState::FetchingKeys);
    assert!(matches!(err.source, BenchError::Decode { scheme: SchemeId::MlKem, .. }));
    assert_eq!(runner.state(), RunnerState::Idle);
    assert_eq!(runner.aggregator().statistics(), &stats_before);
    assert_eq!(runner.aggregator().snapshot().duration_ratio, ratio_before);
    assert_eq!(runner.aggregator().snapshot().last_tick, Some(1));
    assert_eq!(runner.aggregator().snapshot().attempts, 2);

    source.override_ml_kem(None);
    let report = runner.run_once().unwrap();
    assert_eq!(report.tick, 3);
    assert_eq!(runner.aggregator().statistics().count(SchemeId::MlKem), 2);
}

#[test]
fn test_wrong_key_type_is_key_parse_error() {
    let (source, mut runner) = keyring_runner(MlKemWrapMode::EncapsulateOnly);
    // 把 RSA 的负载交给 ML-KEM：Base64 合法，但不是 Kyber-768 公钥
    source.override_ml_kem(Some(&common::rsa_payload()));
    let err = runner.run_once().unwrap_err();
    assert!(matches!(err.source, BenchError::KeyParse { scheme: SchemeId::MlKem, .. }));
    assert_eq!(runner.aggregator().statistics().count(SchemeId::Rsa), 0);
}

#[test]
fn test_prometheus_sink_receives_every_tick() {
    let sink = PrometheusSink::new().unwrap();
    let mut runner = BenchmarkRunner::new(
        LocalKeySource::new(RsaKeyIssuer::new(1024)),
        messages(),
        MetricsAggregator::new(Box::new(sink.clone())),
    )
    .unwrap();
    runner.run_once().unwrap();
    runner.run_once().unwrap();

    let text = sink.render();
    assert!(text.contains("client_encryption_operations_total 2"));
    assert!(text.contains("client_mlkem_encrypted_key_size_bytes 1088"));
    assert!(text.contains("client_rsa_encrypted_key_size_bytes 128"));
    assert!(text.contains("client_encrypted_key_size_ratio 8.5"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_scheduler_runs_exactly_max_ticks() {
    let runner = BenchmarkRunner::new(
        LocalKeySource::new(RsaKeyIssuer::new(1024)),
        messages(),
        MetricsAggregator::default(),
    )
    .unwrap();
    let handle = runner.snapshot_handle();

    let summary = Scheduler::new(runner, Duration::from_millis(10))
        .unwrap()
        .with_max_ticks(Some(4))
        .run_until(std::future::pending())
        .await
        .unwrap();

    assert_eq!(summary.ticks, 4);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.runner.state(), RunnerState::Idle);
    let snapshot = handle.load();
    assert_eq!(snapshot.attempts, 4);
    assert_eq!(snapshot.last_tick, Some(4));
    assert_eq!(snapshot.ml_kem.samples, 4);
}
