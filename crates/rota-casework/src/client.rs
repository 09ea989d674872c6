use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::json;

use crate::types::{CaseApi, CaseApiError, CaseSnapshot, CaseTransaction};

#[derive(Debug, Clone)]
/// Public struct `CaseworkClientConfig` used across rota components.
pub struct CaseworkClientConfig {
    pub api_base: String,
    pub auth_token: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone)]
/// HTTP implementation of [`CaseApi`]. A 409 from the commit endpoint is the
/// store rejecting a stale token and maps to the distinct conflict error.
pub struct CaseworkClient {
    client: reqwest::Client,
    config: CaseworkClientConfig,
}

impl CaseworkClient {
    pub fn new(config: CaseworkClientConfig) -> Result<Self, CaseApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !config.auth_token.trim().is_empty() {
            let bearer = format!("Bearer {}", config.auth_token.trim());
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&bearer).map_err(|error| {
                    CaseApiError::InvalidResponse(format!("invalid auth header: {error}"))
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
}

#[async_trait]
impl CaseApi for CaseworkClient {
    async fn start_transaction(&self, case_id: &str) -> Result<CaseTransaction, CaseApiError> {
        let url = self.endpoint(&format!("/cases/{case_id}/transactions"));
        let response = self.client.post(&url).send().await?;
        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            return Err(CaseApiError::HttpStatus {
                status: status.as_u16(),
                body: raw,
            });
        }
        let transaction: CaseTransaction = serde_json::from_str(&raw)?;
        if transaction.token.trim().is_empty() {
            return Err(CaseApiError::InvalidResponse(
                "case store issued an empty write token".to_string(),
            ));
        }
        Ok(transaction)
    }

    async fn commit(
        &self,
        token: &str,
        snapshot: &CaseSnapshot,
        summary: &str,
        description: &str,
    ) -> Result<CaseSnapshot, CaseApiError> {
        let url = self.endpoint(&format!("/cases/{}/commit", snapshot.case_id));
        let body = json!({
            "token": token,
            "case": snapshot,
            "summary": summary,
            "description": description,
        });
        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if status.as_u16() == 409 {
            return Err(CaseApiError::VersionConflict {
                case_id: snapshot.case_id.clone(),
            });
        }
        let raw = response.text().await?;
        if !status.is_success() {
            return Err(CaseApiError::HttpStatus {
                status: status.as_u16(),
                body: raw,
            });
        }
        Ok(serde_json::from_str(&raw)?)
    }
}
