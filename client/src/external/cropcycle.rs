//! Crop cycle API client
//!
//! Talks to the INNOFarms backend's `/api/cropcycle` endpoints. Responses are
//! wrapped in a `{data, message, statusCode}` envelope; failures are turned
//! into [`AppError`] values carrying the backend's `message` when it sent one.

use std::time::Duration;

use async_trait::async_trait;
use innofarms_shared::{
    FarmId, PlantCropsRequest, PlantingOutcome, QueuedCycleView, ReallocationRequest,
    ShelfAvailabilityData,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};

pub const AVAILABILITY_FALLBACK: &str = "Failed to fetch shelf availability";
pub const PLANTING_FALLBACK: &str = "Error planting crops";
pub const QUEUE_FALLBACK: &str = "Failed to fetch queued crops";
pub const REALLOCATION_FALLBACK: &str = "Failed to update shelf allocation";

/// Transport seam between the workflow controllers and the backend
#[async_trait]
pub trait FarmApi: Send + Sync {
    /// `GET /api/cropcycle/shelf-availability?farmId={id}`
    async fn shelf_availability(&self, farm_id: FarmId) -> AppResult<ShelfAvailabilityData>;

    /// `POST /api/cropcycle`
    async fn plant_crops(&self, request: &PlantCropsRequest) -> AppResult<PlantingResponse>;

    /// `GET /api/cropcycle/pending?farmId={id}`
    async fn pending_cycles(&self, farm_id: FarmId) -> AppResult<Vec<QueuedCycleView>>;

    /// `PUT /api/cropcycle`, returning the server's confirmation message
    async fn update_allocation(&self, request: &ReallocationRequest) -> AppResult<Option<String>>;
}

/// Successful planting response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlantingResponse {
    pub outcome: PlantingOutcome,
    pub message: Option<String>,
}

/// Response envelope used by every crop cycle endpoint
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    data: Option<T>,
    message: Option<String>,
    #[serde(rename = "statusCode")]
    status_code: Option<u16>,
}

impl<T> ApiEnvelope<T> {
    fn empty() -> Self {
        Self {
            data: None,
            message: None,
            status_code: None,
        }
    }
}

/// reqwest-backed [`FarmApi`]
#[derive(Clone)]
pub struct HttpFarmApi {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpFarmApi {
    /// Create a client with default settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: None,
        }
    }

    /// Create a client from configuration, applying the request timeout
    pub fn from_config(config: &ApiConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and unwrap the response envelope
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> AppResult<ApiEnvelope<T>> {
        let request_id = Uuid::new_v4().to_string();
        let mut request = request.header("x-request-id", request_id.as_str());
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%request_id, error = %e, "Farm backend request failed");
            AppError::Transport {
                status: None,
                message: fallback.to_string(),
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::warn!(%request_id, error = %e, "Failed to read farm backend response");
            AppError::Transport {
                status: Some(status.as_u16()),
                message: fallback.to_string(),
            }
        })?;

        if !status.is_success() {
            tracing::warn!(%request_id, status = status.as_u16(), "Farm backend returned an error");
            return Err(AppError::Transport {
                status: Some(status.as_u16()),
                message: extract_message(&body).unwrap_or_else(|| fallback.to_string()),
            });
        }

        // 204 and other bodiless successes carry no envelope
        if body.trim().is_empty() {
            tracing::debug!(%request_id, status = status.as_u16(), "Farm backend returned an empty body");
            return Ok(ApiEnvelope::empty());
        }

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(%request_id, error = %e, "Failed to parse farm backend response");
            AppError::Transport {
                status: Some(status.as_u16()),
                message: fallback.to_string(),
            }
        })?;

        if let Some(code) = envelope.status_code.filter(|c| *c >= 400) {
            tracing::warn!(%request_id, status_code = code, "Farm backend rejected the request");
            return Err(AppError::ServerRejection {
                status_code: code,
                message: non_empty(envelope.message).unwrap_or_else(|| fallback.to_string()),
            });
        }

        tracing::debug!(%request_id, status = status.as_u16(), "Farm backend request completed");
        Ok(envelope)
    }
}

#[async_trait]
impl FarmApi for HttpFarmApi {
    async fn shelf_availability(&self, farm_id: FarmId) -> AppResult<ShelfAvailabilityData> {
        let request = self
            .client
            .get(self.url("/api/cropcycle/shelf-availability"))
            .query(&[("farmId", farm_id.get())]);

        let envelope = self.send(request, AVAILABILITY_FALLBACK).await?;
        require_data(envelope, AVAILABILITY_FALLBACK)
    }

    async fn plant_crops(&self, request: &PlantCropsRequest) -> AppResult<PlantingResponse> {
        let builder = self.client.post(self.url("/api/cropcycle")).json(request);

        let envelope: ApiEnvelope<PlantingOutcome> = self.send(builder, PLANTING_FALLBACK).await?;
        let message = envelope.message.clone();
        let outcome = require_data(envelope, PLANTING_FALLBACK)?;
        Ok(PlantingResponse { outcome, message })
    }

    async fn pending_cycles(&self, farm_id: FarmId) -> AppResult<Vec<QueuedCycleView>> {
        let request = self
            .client
            .get(self.url("/api/cropcycle/pending"))
            .query(&[("farmId", farm_id.get())]);

        let envelope: ApiEnvelope<Vec<QueuedCycleView>> =
            self.send(request, QUEUE_FALLBACK).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn update_allocation(&self, request: &ReallocationRequest) -> AppResult<Option<String>> {
        let builder = self.client.put(self.url("/api/cropcycle")).json(request);

        let envelope: ApiEnvelope<serde_json::Value> =
            self.send(builder, REALLOCATION_FALLBACK).await?;
        Ok(non_empty(envelope.message))
    }
}

fn require_data<T>(envelope: ApiEnvelope<T>, fallback: &str) -> AppResult<T> {
    match envelope.data {
        Some(data) => Ok(data),
        None => Err(AppError::Transport {
            status: None,
            message: non_empty(envelope.message).unwrap_or_else(|| fallback.to_string()),
        }),
    }
}

fn non_empty(message: Option<String>) -> Option<String> {
    message.filter(|m| !m.trim().is_empty())
}

/// Pull the `message` field out of an error body, if it has one
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .filter(|m| !m.trim().is_empty())
}
