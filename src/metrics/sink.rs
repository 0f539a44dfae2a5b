use crate::metrics::StatisticsSnapshot;

/// 外部指标接收端。聚合器每个 tick 覆盖写入一次，不做追加。
pub trait MetricsSink: Send {
    /// 一次 tick 尝试开始。
    fn record_attempt(&mut self) {}

    /// 发布最新快照。
    fn publish(&mut self, snapshot: &StatisticsSnapshot);
}

/// 丢弃所有输出，用于测试和不需要导出的场景。
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn publish(&mut self, _snapshot: &StatisticsSnapshot) {}
}
