use std::env;
use std::time::Duration;

use crate::error::AppError;

/// Where reports go unless `AMBIENT_ENDPOINT` overrides it.
pub const DEFAULT_ENDPOINT: &str = "https://api.datadoghq.com/api/v1/series";

const DEFAULT_REPORT_INTERVAL_SECS: u64 = 10;

/// Process configuration, supplied by the environment prior to startup.
///
/// The credential and host identity are required; everything else has a
/// default. A missing required value is a configuration error that
/// aborts startup before any stream exists.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Authentication credential for the delivery sink.
    pub api_key: String,
    /// Host identifier attached to every report as a tag.
    pub hostname: String,
    /// Delivery URL.
    pub endpoint: String,
    /// Capture device name; host default input device when unset.
    pub input_device: Option<String>,
    /// Reporting period.
    pub report_interval: Duration,
}

impl ProbeConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let api_key = require("AMBIENT_API_KEY")?;
        let hostname = require("AMBIENT_HOSTNAME")?;
        let endpoint =
            env::var("AMBIENT_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let input_device = env::var("AMBIENT_INPUT_DEVICE").ok();
        let report_interval = report_interval_from_env()?;

        Ok(Self {
            api_key,
            hostname,
            endpoint,
            input_device,
            report_interval,
        })
    }
}

fn require(key: &str) -> Result<String, AppError> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::Config(format!("{} is not set", key))),
    }
}

fn report_interval_from_env() -> Result<Duration, AppError> {
    let raw = match env::var("AMBIENT_REPORT_INTERVAL_SECS") {
        Ok(raw) => raw,
        Err(_) => return Ok(Duration::from_secs(DEFAULT_REPORT_INTERVAL_SECS)),
    };

    let secs: u64 = raw.parse().map_err(|_| {
        AppError::Config(format!(
            "AMBIENT_REPORT_INTERVAL_SECS is not a number: {}",
            raw
        ))
    })?;
    if secs == 0 {
        return Err(AppError::Config(
            "AMBIENT_REPORT_INTERVAL_SECS must be positive".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
