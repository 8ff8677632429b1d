//! Callable functions client for demand forecasting and anomaly detection
//!
//! The functions run outside this service. Parameters go out as
//! `{ "data": ... }` and answers come back wrapped in `{ "result": ... }`.

use chrono::NaiveDate;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use shared::StockLogEntry;
use std::time::Duration;
use uuid::Uuid;

use crate::config::FunctionsConfig;
use crate::error::{AppError, AppResult};

/// Client for the callable functions endpoint
#[derive(Clone)]
pub struct ForecastClient {
    http_client: Client,
    endpoint: String,
    api_key: String,
}

/// Usage of one ingredient on one day, in base units
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyUsage {
    pub date: NaiveDate,
    pub quantity: f64,
}

/// Parameters for the demand forecast function
#[derive(Debug, Serialize)]
pub struct DemandForecastParams {
    pub ingredient_id: Uuid,
    pub unit: String,
    pub history: Vec<DailyUsage>,
    pub horizon_days: u32,
}

/// Forecast returned by the function
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandForecast {
    pub points: Vec<DailyUsage>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Parameters for the anomaly detection function
#[derive(Debug, Serialize)]
pub struct AnomalyParams<'a> {
    pub ingredient_id: Uuid,
    pub entries: &'a [StockLogEntry],
}

/// One flagged stock movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAnomaly {
    #[serde(default)]
    pub entry_id: Option<Uuid>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub score: f64,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Serialize)]
struct CallEnvelope<'a, P> {
    data: &'a P,
}

impl ForecastClient {
    /// Create a new ForecastClient from configuration
    pub fn new(config: &FunctionsConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Forecast daily usage of one ingredient
    pub async fn forecast_demand(&self, params: &DemandForecastParams) -> AppResult<DemandForecast> {
        self.call("forecastDemand", params).await
    }

    /// Flag unusual stock movements
    pub async fn detect_anomalies(&self, params: &AnomalyParams<'_>) -> AppResult<Vec<StockAnomaly>> {
        self.call("detectStockAnomalies", params).await
    }

    async fn call<P, R>(&self, function: &str, params: &P) -> AppResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.endpoint, function);

        let mut request = self
            .http_client
            .post(&url)
            .json(&CallEnvelope { data: params });
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("{} request failed: {}", function, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(function, %status, "callable function failed");
            return Err(AppError::ExternalService(format!(
                "{} returned {} - {}",
                function, status, body
            )));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse {} response: {}", function, e))
        })?;

        unwrap_envelope(function, body)
    }
}

/// Pull the payload out of a `{ "result": ... }` envelope
pub fn unwrap_envelope<R: DeserializeOwned>(function: &str, mut body: serde_json::Value) -> AppResult<R> {
    if let Some(error) = body.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(AppError::ExternalService(format!("{}: {}", function, message)));
    }

    let result = body
        .get_mut("result")
        .map(serde_json::Value::take)
        .ok_or_else(|| AppError::ExternalService(format!("{} response has no result", function)))?;

    serde_json::from_value(result).map_err(|e| {
        AppError::ExternalService(format!("Unexpected {} result: {}", function, e))
    })
}
