#![forbid(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use kem_bench::asymmetric::MlKemWrapMode;
use kem_bench::client::{KeySource, LocalKeySource};
use kem_bench::common::{BenchConfig, KeySourceKind, logging};
use kem_bench::contract::SchemeId;
use kem_bench::metrics::{IssuerMetrics, MetricsAggregator, PrometheusSink};
use kem_bench::runner::{BenchmarkRunner, Scheduler};
use kem_bench::server::RsaKeyIssuer;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(
    name = "kem-bench",
    version,
    about = "Periodic RSA-2048 vs ML-KEM-768 hybrid-encryption benchmark"
)]
struct Cli {
    /// JSON configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Issue keys in-process instead of calling the key-issuing services
    #[arg(long)]
    local: bool,
    /// Stop after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Interval between ticks in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,
    /// Wait before the first tick in milliseconds
    #[arg(long)]
    startup_delay_ms: Option<u64>,
    /// Encrypt the symmetric key under the ML-KEM shared secret
    #[arg(long)]
    bind_kem_key: bool,
    /// Print the final snapshot as JSON together with the metrics exposition
    #[arg(long)]
    report: bool,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<BenchConfig> {
        let mut config = match &self.config {
            Some(path) => BenchConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => BenchConfig::default(),
        };
        config.apply_env().context("reading KEM_BENCH_* environment")?;

        if self.local {
            config.key_source = KeySourceKind::Local;
        }
        if let Some(n) = self.max_ticks {
            config.max_ticks = Some(n);
        }
        if let Some(ms) = self.interval_ms {
            config.interval_ms = ms;
        }
        if let Some(ms) = self.startup_delay_ms {
            config.startup_delay_ms = ms;
        }
        if self.bind_kem_key {
            config.ml_kem_wrap_mode = MlKemWrapMode::BindSymmetricKey;
        }
        config.validate()?;
        Ok(config)
    }
}

fn key_source(config: &BenchConfig, sink: &PrometheusSink) -> anyhow::Result<Box<dyn KeySource + Send>> {
    match config.key_source {
        KeySourceKind::Local => {
            let source = LocalKeySource::new(RsaKeyIssuer::new(config.rsa_key_bits)).with_metrics(
                IssuerMetrics::register(sink.registry(), SchemeId::Rsa)?,
                IssuerMetrics::register(sink.registry(), SchemeId::MlKem)?,
            );
            Ok(Box::new(source))
        }
        #[cfg(feature = "http")]
        KeySourceKind::Http => Ok(Box::new(kem_bench::client::HttpKeySource::new(
            config.endpoints.clone(),
            config.connect_timeout(),
            config.request_timeout(),
        ))),
        #[cfg(not(feature = "http"))]
        KeySourceKind::Http => anyhow::bail!("built without the `http` feature; use --local"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    if let Err(e) = logging::init(&config.log_filter) {
        eprintln!("{e}");
    }
    info!(version = kem_bench::VERSION, source = ?config.key_source, mode = ?config.ml_kem_wrap_mode, "starting kem-bench");

    let sink = PrometheusSink::new()?;
    let source = key_source(&config, &sink)?;
    let runner = BenchmarkRunner::new(
        source,
        config.messages.clone(),
        MetricsAggregator::new(Box::new(sink.clone())),
    )?
    .with_ml_kem_mode(config.ml_kem_wrap_mode);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let summary = Scheduler::new(runner, config.interval())?
        .with_startup_delay(config.startup_delay())
        .with_max_ticks(config.max_ticks)
        .run_until(shutdown)
        .await?;

    if cli.report || config.max_ticks.is_some() {
        let snapshot = summary.runner.snapshot_handle().load();
        println!("{}", serde_json::to_string_pretty(&*snapshot)?);
        print!("{}", sink.render());
    }
    info!(ticks = summary.ticks, failed = summary.failed, "kem-bench finished");
    Ok(())
}
