//! 固定间隔调度器。
//!
//! 每个 tick 在阻塞线程池上运行，编排器被移入任务并在完成后交还，
//! 因此同一时刻最多只有一个 tick 在执行。超时的 tick 会推迟下一次触发，
//! 不会补发积压的触发。

use crate::client::provider::KeySource;
use crate::error::{BenchError, Result as BenchResult};
use crate::runner::BenchmarkRunner;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinError;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

/// 调度结束时的汇总
pub struct RunSummary<S> {
    pub runner: BenchmarkRunner<S>,
    pub ticks: u64,
    pub failed: u64,
}

pub struct Scheduler<S> {
    runner: BenchmarkRunner<S>,
    interval: Duration,
    startup_delay: Duration,
    max_ticks: Option<u64>,
}

impl<S: KeySource + Send + 'static> Scheduler<S> {
    /// 创建调度器。间隔必须大于零。
    pub fn new(runner: BenchmarkRunner<S>, interval: Duration) -> BenchResult<Self> {
        if interval.is_zero() {
            return Err(BenchError::Config("tick 间隔必须大于零".to_string()));
        }
        Ok(Self {
            runner,
            interval,
            startup_delay: Duration::ZERO,
            max_ticks: None,
        })
    }

    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// 运行直到 `shutdown` 完成或达到 `max_ticks`。
    ///
    /// 正在执行的 tick 总会先完成，之后才检查停止条件。
    ///
    /// # Errors
    ///
    /// 只有在阻塞任务被取消时返回 `JoinError`；tick 内部的 panic 会原样传播。
    pub async fn run_until<F>(self, shutdown: F) -> Result<RunSummary<S>, JoinError>
    where
        F: Future<Output = ()>,
    {
        let Scheduler {
            mut runner,
            interval,
            startup_delay,
            max_ticks,
        } = self;
        tokio::pin!(shutdown);

        let mut ticks = 0u64;
        let mut failed = 0u64;

        if !startup_delay.is_zero() {
            info!(?startup_delay, "waiting for key-issuing services");
            tokio::select! {
                _ = &mut shutdown => return Ok(RunSummary { runner, ticks, failed }),
                _ = time::sleep(startup_delay) => {}
            }
        }

        let mut timer = time::interval(interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(?interval, ?max_ticks, "benchmark scheduler started");

        loop {
            if max_ticks.is_some_and(|max| ticks >= max) {
                break;
            }
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                }
                _ = timer.tick() => {}
            }

            let joined = tokio::task::spawn_blocking(move || {
                let outcome = runner.run_once();
                (runner, outcome.is_ok())
            })
            .await;
            let (returned, ok) = match joined {
                Ok(pair) => pair,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => {
                    warn!(error = %e, "benchmark task cancelled");
                    return Err(e);
                }
            };
            runner = returned;
            ticks += 1;
            if !ok {
                failed += 1;
            }
        }

        info!(ticks, failed, "benchmark scheduler stopped");
        Ok(RunSummary {
            runner,
            ticks,
            failed,
        })
    }
}
