use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use ambient_foundation::{DeliveryError, ProbeConfig};
use ambient_telemetry::{MetricsTransport, ReportSnapshot};

/// Posts aggregated statistics to the monitoring backend as JSON, API
/// key in a request header. Failures map to [`DeliveryError`] and are
/// the reporter's problem; nothing here retries.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(config: &ProbeConfig) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn payload(report: &ReportSnapshot) -> Value {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        json!({
            "timestamp": timestamp,
            "tags": report.tags,
            "series": {
                "amplitude": report.series.amplitude,
                "peak": report.series.peak,
            },
        })
    }
}

#[async_trait]
impl MetricsTransport for HttpTransport {
    async fn deliver(&self, report: &ReportSnapshot) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("DD-API-KEY", &self.api_key)
            .json(&Self::payload(report))
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
