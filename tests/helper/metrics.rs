//! Prometheus stand-in answering every query with fixed series

use std::collections::BTreeMap;

use async_trait::async_trait;

use meshscope::prometheus::{MetricsClient, MetricsError, QueryRange, Sample, SampleStream};

#[derive(Default)]
pub struct FakeMetrics {
    /// Value of every range datapoint
    pub range_value: Option<f64>,
    pub samples: Vec<Sample>,
    /// Makes every query fail
    pub failing: bool,
}

impl FakeMetrics {
    pub fn bookinfo() -> Self {
        let labels = BTreeMap::from([
            ("destination_canonical_service".to_string(), "details".to_string()),
            ("destination_workload".to_string(), "details-v1".to_string()),
            ("request_protocol".to_string(), "http".to_string()),
            ("response_code".to_string(), "200".to_string()),
        ]);
        Self {
            range_value: Some(1.5),
            samples: vec![Sample { labels, value: 2.0 }],
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), MetricsError> {
        if self.failing {
            return Err(MetricsError::Query {
                error_type: "unavailable".to_string(),
                message: "prometheus is down".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MetricsClient for FakeMetrics {
    async fn query_range(
        &self,
        _query: &str,
        range: &QueryRange,
    ) -> Result<Vec<SampleStream>, MetricsError> {
        self.check()?;
        let Some(value) = self.range_value else {
            return Ok(Vec::new());
        };
        let values = (range.start..=range.end)
            .step_by(range.step.max(1) as usize)
            .map(|t| (t as f64, value))
            .collect();
        Ok(vec![SampleStream {
            labels: BTreeMap::new(),
            values,
        }])
    }

    async fn query(&self, _query: &str, _time: i64) -> Result<Vec<Sample>, MetricsError> {
        self.check()?;
        Ok(self.samples.clone())
    }
}
