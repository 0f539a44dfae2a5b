//! In-process key source: issues keys directly instead of calling the HTTP services.

use crate::client::provider::KeySource;
use crate::contract::SchemeId;
use crate::error::{BenchError, Result};
use crate::metrics::IssuerMetrics;
use crate::server::issuer::{KeyIssuer, MlKemKeyIssuer, RsaKeyIssuer};

/// 在本进程内生成密钥并序列化为与 HTTP 服务相同的 JSON 负载。
///
/// 适用于没有部署签发服务的单机运行以及集成测试。
#[derive(Clone, Default)]
pub struct LocalKeySource {
    rsa: RsaKeyIssuer,
    ml_kem: MlKemKeyIssuer,
    rsa_metrics: Option<IssuerMetrics>,
    ml_kem_metrics: Option<IssuerMetrics>,
}

impl LocalKeySource {
    pub fn new(rsa: RsaKeyIssuer) -> Self {
        Self {
            rsa,
            ..Default::default()
        }
    }

    /// 附加签发端指标，每次签发都会记录生成耗时。
    pub fn with_metrics(mut self, rsa: IssuerMetrics, ml_kem: IssuerMetrics) -> Self {
        self.rsa_metrics = Some(rsa);
        self.ml_kem_metrics = Some(ml_kem);
        self
    }
}

impl KeySource for LocalKeySource {
    fn fetch(&self, scheme: SchemeId) -> Result<String> {
        let (issued, metrics) = match scheme {
            SchemeId::Rsa => (self.rsa.issue()?, &self.rsa_metrics),
            SchemeId::MlKem => (self.ml_kem.issue()?, &self.ml_kem_metrics),
        };
        if let Some(m) = metrics {
            m.observe(issued.generation_time);
        }
        serde_json::to_string(&issued.response)
            .map_err(|e| BenchError::transport(scheme, format!("序列化响应失败: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::provider::decode_response;
    use prometheus::Registry;

    #[test]
    fn test_local_source_serves_both_schemes() {
        let registry = Registry::new();
        let source = LocalKeySource::new(RsaKeyIssuer::new(1024)).with_metrics(
            IssuerMetrics::register(&registry, SchemeId::Rsa).unwrap(),
            IssuerMetrics::register(&registry, SchemeId::MlKem).unwrap(),
        );

        let rsa = decode_response(SchemeId::Rsa, &source.fetch(SchemeId::Rsa).unwrap()).unwrap();
        assert_eq!(rsa.declared_size, 1024);

        let body = source.fetch(SchemeId::MlKem).unwrap();
        assert!(body.contains("ML-KEM-768"));
        source.fetch(SchemeId::MlKem).unwrap();

        assert_eq!(source.rsa_metrics.as_ref().unwrap().requests(), 1);
        assert_eq!(source.ml_kem_metrics.as_ref().unwrap().requests(), 2);
    }
}
