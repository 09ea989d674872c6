use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::json;

use crate::types::{
    CancellationReason, HearingChangeResponse, HearingRecord, HearingRequestPayload,
    ListingsApiError, SchedulingApi,
};

#[derive(Debug, Clone)]
/// Public struct `ListingsClientConfig` used across rota components.
pub struct ListingsClientConfig {
    pub api_base: String,
    pub auth_token: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone)]
/// HTTP implementation of [`SchedulingApi`]. One request per call; transient
/// failures are classified, not retried here, so the caller's channel
/// semantics decide redelivery.
pub struct ListingsClient {
    client: reqwest::Client,
    config: ListingsClientConfig,
}

impl ListingsClient {
    pub fn new(config: ListingsClientConfig) -> Result<Self, ListingsApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !config.auth_token.trim().is_empty() {
            let bearer = format!("Bearer {}", config.auth_token.trim());
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&bearer).map_err(|error| {
                    ListingsApiError::InvalidResponse(format!("invalid auth header: {error}"))
                })?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_millis(
                config.request_timeout_ms.max(1),
            ))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        format!("{base}{path}")
    }

    async fn decode_success<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ListingsApiError> {
        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            return Err(ListingsApiError::HttpStatus {
                status: status.as_u16(),
                body: raw,
            });
        }
        Ok(serde_json::from_str(&raw)?)
    }
}

#[async_trait]
impl SchedulingApi for ListingsClient {
    async fn get_hearing(&self, hearing_id: &str) -> Result<HearingRecord, ListingsApiError> {
        let url = self.endpoint(&format!("/hearings/{hearing_id}"));
        let response = self.client.get(&url).send().await?;
        if response.status().as_u16() == 404 {
            return Err(ListingsApiError::NotFound {
                hearing_id: hearing_id.to_string(),
            });
        }
        Self::decode_success(response).await
    }

    async fn list_hearings(&self, case_id: &str) -> Result<Vec<HearingRecord>, ListingsApiError> {
        let url = self.endpoint(&format!("/cases/{case_id}/hearings"));
        let response = self.client.get(&url).send().await?;
        Self::decode_success(response).await
    }

    async fn create_hearing(
        &self,
        payload: &HearingRequestPayload,
    ) -> Result<HearingChangeResponse, ListingsApiError> {
        let url = self.endpoint("/hearings");
        let response = self.client.post(&url).json(payload).send().await?;
        Self::decode_success(response).await
    }

    async fn update_hearing(
        &self,
        hearing_id: &str,
        payload: &HearingRequestPayload,
    ) -> Result<HearingChangeResponse, ListingsApiError> {
        let url = self.endpoint(&format!("/hearings/{hearing_id}"));
        let response = self.client.put(&url).json(payload).send().await?;
        if response.status().as_u16() == 404 {
            return Err(ListingsApiError::NotFound {
                hearing_id: hearing_id.to_string(),
            });
        }
        Self::decode_success(response).await
    }

    async fn cancel_hearing(
        &self,
        hearing_id: &str,
        reason: &CancellationReason,
    ) -> Result<HearingChangeResponse, ListingsApiError> {
        let url = self.endpoint(&format!("/hearings/{hearing_id}"));
        let body = json!({ "cancellation_reason": reason.as_str() });
        let response = self.client.delete(&url).json(&body).send().await?;
        if response.status().as_u16() == 404 {
            return Err(ListingsApiError::NotFound {
                hearing_id: hearing_id.to_string(),
            });
        }
        Self::decode_success(response).await
    }
}
