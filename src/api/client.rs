use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::api::signal::CombinedSignal;
use crate::config::Settings;
use crate::error::{AppError, AppResult};
use crate::models::conversation::{Conversation, DataEnvelope};
use crate::models::item::{IngestRequest, IngestResponse, ItemsResponse, KnowledgeItem, SourceTag};
use crate::models::query::{QueryAnswer, QueryEnvelope, QueryRequest};

const API_PREFIX: &str = "/api/data";

/// Extra headroom so the transport timeout never beats the query's own timeout.
const QUERY_TRANSPORT_SLACK: Duration = Duration::from_secs(5);

/// Typed access to the knowledge inbox backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    query_timeout: Duration,
}

impl ApiClient {
    pub fn new(settings: &Settings) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("HTTP client error: {e}")))?;

        Ok(Self {
            http,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            query_timeout: Duration::from_secs(settings.query_timeout_secs),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// `GET /items?source=...`
    pub async fn list_items(&self, source: SourceTag) -> AppResult<Vec<KnowledgeItem>> {
        let resp: ItemsResponse = self
            .get_json("/items", &[("source", source.as_str())])
            .await?;
        log::debug!("Fetched {} {} items", resp.data.len(), source);
        Ok(resp.data)
    }

    /// `POST /ingest`. A `success: false` body is returned as-is; callers
    /// decide how to surface it (see [`IngestResponse::into_result`]).
    pub async fn ingest(&self, source: SourceTag, content: &str) -> AppResult<IngestResponse> {
        let body = IngestRequest {
            source,
            content: content.to_string(),
        };
        log::info!("Ingesting {} ({} chars)", source, content.len());
        self.post_json("/ingest", &body).await
    }

    pub async fn ingest_note(&self, content: &str) -> AppResult<IngestResponse> {
        self.ingest(SourceTag::Note, content).await
    }

    pub async fn ingest_url(&self, url: &str) -> AppResult<IngestResponse> {
        self.ingest(SourceTag::Url, url).await
    }

    /// `GET /conversations`
    pub async fn list_conversations(&self) -> AppResult<Vec<Conversation>> {
        let resp: DataEnvelope<Vec<Conversation>> = self.get_json("/conversations", &[]).await?;
        Ok(resp.data)
    }

    /// `GET /conversations/:id`
    pub async fn fetch_conversation(&self, id: i64) -> AppResult<Conversation> {
        let resp: DataEnvelope<Conversation> = self
            .get_json(&format!("/conversations/{id}"), &[])
            .await?;
        Ok(resp.data)
    }

    /// `POST /query` with the configured timeout.
    pub async fn query(
        &self,
        request: &QueryRequest,
        cancel: Option<CancellationToken>,
    ) -> AppResult<QueryAnswer> {
        self.query_with_timeout(request, cancel, self.query_timeout).await
    }

    /// `POST /query`, aborted by whichever fires first: `cancel` or `timeout`.
    pub async fn query_with_timeout(
        &self,
        request: &QueryRequest,
        cancel: Option<CancellationToken>,
        timeout: Duration,
    ) -> AppResult<QueryAnswer> {
        let signal = CombinedSignal::new(cancel, timeout);
        log::info!(
            "[Query] Sending question ({} chars), conversation_id={:?}",
            request.question.len(),
            request.conversation_id
        );

        let send = async {
            let resp = self
                .http
                .post(self.endpoint("/query"))
                .timeout(timeout + QUERY_TRANSPORT_SLACK)
                .json(request)
                .send()
                .await?;
            let envelope: QueryEnvelope = read_json(resp).await?;
            Ok::<_, AppError>(envelope.into_answer())
        };

        tokio::select! {
            reason = signal.aborted() => {
                log::warn!("[Query] Aborted: {:?}", reason);
                Err(reason.into())
            }
            result = send => {
                match &result {
                    Ok(answer) => log::info!("[Query] Answer received, conversation_id={:?}", answer.conversation_id),
                    Err(e) => log::error!("[Query] Failed: {}", e),
                }
                result
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> AppResult<T> {
        let url = self.endpoint(path);
        log::debug!("GET {}", url);
        let resp = self.http.get(&url).query(query).send().await?;
        read_json(resp).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> AppResult<T> {
        let url = self.endpoint(path);
        log::debug!("POST {}", url);
        let resp = self.http.post(&url).json(body).send().await?;
        read_json(resp).await
    }
}

/// Reject non-2xx statuses, then decode the body.
async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> AppResult<T> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        log::warn!("HTTP {} from backend: {}", status, body);
        return Err(AppError::Http {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(AppError::Serde)
}
