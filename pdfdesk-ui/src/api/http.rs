//! HTTP implementation of [`RemoteStore`]

use super::{ApiError, ApiResult, QaReply, RemoteStore};
use crate::upload::PendingFile;
use async_trait::async_trait;
use pdfdesk_common::models::{PresignedUrl, QuestionRequest};
use pdfdesk_common::{Record, RecordId, SelectionFilter};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::Response;

const USER_AGENT: &str = concat!("pdfdesk-ui/", env!("CARGO_PKG_VERSION"));

/// Remote document service reached over HTTP
///
/// No request timeout is configured: once issued, a request runs until the
/// server or the connection ends it.
#[derive(Clone)]
pub struct HttpRemote {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpRemote {
    /// `base_url` must not end with a slash (see `config::normalize_api_url`)
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turn a non-2xx response into `ApiError::Status`
async fn ensure_success(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

fn network(e: reqwest::Error) -> ApiError {
    ApiError::Network(e.to_string())
}

fn decode(e: reqwest::Error) -> ApiError {
    ApiError::Decode(e.to_string())
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn list(&self, filter: SelectionFilter) -> ApiResult<Vec<Record>> {
        let mut request = self.http_client.get(self.url("/pdfs"));
        if let Some(selected) = filter.query_value() {
            request = request.query(&[("selected", selected)]);
        }

        tracing::debug!(%filter, "Fetching records");

        let response = request.send().await.map_err(network)?;
        let records: Vec<Record> = ensure_success(response).await?.json().await.map_err(decode)?;

        tracing::debug!(%filter, count = records.len(), "Fetched records");
        Ok(records)
    }

    async fn replace(&self, record: &Record) -> ApiResult<()> {
        let url = self.url(&format!("/pdfs/{}", record.id));
        tracing::debug!(id = %record.id, url = %url, "Replacing record");

        let response = self
            .http_client
            .put(&url)
            .json(record)
            .send()
            .await
            .map_err(network)?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete(&self, id: RecordId) -> ApiResult<()> {
        let url = self.url(&format!("/pdfs/{}", id));
        tracing::debug!(%id, url = %url, "Deleting record");

        let response = self.http_client.delete(&url).send().await.map_err(network)?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn upload(&self, file: &PendingFile) -> ApiResult<Record> {
        let part = Part::bytes(file.content.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| ApiError::Network(format!("invalid content type: {}", e)))?;
        let form = Form::new().part("file", part);

        tracing::debug!(
            file_name = %file.file_name,
            size = file.content.len(),
            "Uploading file"
        );

        let response = self
            .http_client
            .post(self.url("/pdfs/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(network)?;
        let record: Record = ensure_success(response).await?.json().await.map_err(decode)?;
        Ok(record)
    }

    async fn presigned_url(&self, id: RecordId) -> ApiResult<String> {
        let url = self.url(&format!("/pdfs/{}/presigned-url", id));
        let response = self.http_client.get(&url).send().await.map_err(network)?;
        let body: PresignedUrl = ensure_success(response).await?.json().await.map_err(decode)?;
        Ok(body.url)
    }

    async fn ask(&self, id: RecordId, question: &str) -> ApiResult<QaReply> {
        let url = self.url(&format!("/pdfs/qa-pdf/{}", id));
        tracing::debug!(%id, url = %url, "Submitting question");

        let response = self
            .http_client
            .post(&url)
            .json(&QuestionRequest {
                question: question.to_string(),
            })
            .send()
            .await
            .map_err(network)?;
        let response = ensure_success(response).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(decode)?;

        QaReply::decode(content_type.as_deref(), body)
    }
}
