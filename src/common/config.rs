//!
//! # 配置模块
//!
//! 基准运行所需的全部可配置项：签发服务地址、调度间隔、传输超时、
//! 消息集合以及 ML-KEM 包裹模式。
//!
//! 加载顺序：JSON 配置文件 → `KEM_BENCH_*` 环境变量 → 命令行参数（由二进制处理）。
//!
use crate::asymmetric::MlKemWrapMode;
use crate::asymmetric::systems::traditional::rsa::DEFAULT_KEY_BITS;
use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "KEM_BENCH_";

/// 两个密钥签发服务的地址
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointConfig {
    #[serde(default = "default_rsa_endpoint")]
    pub rsa: String,
    #[serde(default = "default_ml_kem_endpoint")]
    pub ml_kem: String,
}

fn default_rsa_endpoint() -> String {
    "http://rsa-server:8080/public-key".to_string()
}

fn default_ml_kem_endpoint() -> String {
    "http://ml-kem-server:8081/public-key".to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            rsa: default_rsa_endpoint(),
            ml_kem: default_ml_kem_endpoint(),
        }
    }
}

/// 公钥的获取方式
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeySourceKind {
    /// 通过 HTTP 请求外部签发服务
    #[default]
    Http,
    /// 在本进程内签发
    Local,
}

/// 完整的基准配置。所有字段都有默认值，配置文件可以只写需要覆盖的部分。
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BenchConfig {
    pub endpoints: EndpointConfig,
    pub key_source: KeySourceKind,
    /// 两次 tick 之间的间隔（毫秒）
    pub interval_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// 第一次 tick 之前的等待时间，留给签发服务启动
    pub startup_delay_ms: u64,
    /// 达到该次数后停止；`None` 表示一直运行到收到中断信号
    pub max_ticks: Option<u64>,
    pub messages: Vec<String>,
    pub ml_kem_wrap_mode: MlKemWrapMode,
    /// 本地签发时使用的 RSA 模数位数
    pub rsa_key_bits: usize,
    pub log_filter: String,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            endpoints: EndpointConfig::default(),
            key_source: KeySourceKind::default(),
            interval_ms: 1000,
            connect_timeout_ms: 3000,
            request_timeout_ms: 5000,
            startup_delay_ms: 3000,
            max_ticks: None,
            messages: default_messages(),
            ml_kem_wrap_mode: MlKemWrapMode::default(),
            rsa_key_bits: DEFAULT_KEY_BITS,
            log_filter: "info".to_string(),
        }
    }
}

fn default_messages() -> Vec<String> {
    vec!["量子コンピュータに対抗するポスト量子暗号".to_string()]
}

impl BenchConfig {
    /// 从 JSON 文件加载配置，缺失的字段取默认值。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&content).map_err(|e| {
            BenchError::Config(format!(
                "解析配置文件 {} 失败: {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    /// 用 `KEM_BENCH_*` 环境变量覆盖当前配置。
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(std::env::vars())
    }

    /// 用给定的键值对覆盖当前配置，键名需带 `KEM_BENCH_` 前缀。
    pub fn apply_vars<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value: String = value.into();
            match name {
                "RSA_ENDPOINT" => self.endpoints.rsa = value,
                "ML_KEM_ENDPOINT" => self.endpoints.ml_kem = value,
                "KEY_SOURCE" => self.key_source = parse_enum(name, &value)?,
                "INTERVAL_MS" => self.interval_ms = parse_number(name, &value)?,
                "CONNECT_TIMEOUT_MS" => self.connect_timeout_ms = parse_number(name, &value)?,
                "REQUEST_TIMEOUT_MS" => self.request_timeout_ms = parse_number(name, &value)?,
                "STARTUP_DELAY_MS" => self.startup_delay_ms = parse_number(name, &value)?,
                "MAX_TICKS" => self.max_ticks = Some(parse_number(name, &value)?),
                "ML_KEM_WRAP_MODE" => self.ml_kem_wrap_mode = parse_enum(name, &value)?,
                "RSA_KEY_BITS" => self.rsa_key_bits = parse_number(name, &value)?,
                "LOG" => self.log_filter = value,
                _ => {}
            }
        }
        Ok(())
    }

    /// 检查配置是否可用于运行。
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(BenchError::Config("interval_ms 必须大于 0".to_string()));
        }
        if self.connect_timeout_ms == 0 || self.request_timeout_ms == 0 {
            return Err(BenchError::Config("传输超时必须是有限的正值".to_string()));
        }
        if self.messages.is_empty() {
            return Err(BenchError::Config("消息集合不能为空".to_string()));
        }
        if self.rsa_key_bits < 1024 {
            return Err(BenchError::Config(format!(
                "RSA 密钥位数过小: {}",
                self.rsa_key_bits
            )));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| BenchError::Config(format!("{}{}={:?}: {}", ENV_PREFIX, name, value, e)))
}

/// 枚举值沿用配置文件中的 snake_case 写法。
fn parse_enum<T: for<'de> Deserialize<'de>>(name: &str, value: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::String(value.trim().to_lowercase()))
        .map_err(|e| BenchError::Config(format!("{}{}={:?}: {}", ENV_PREFIX, name, value, e)))
}
