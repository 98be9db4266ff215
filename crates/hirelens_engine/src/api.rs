use std::time::Duration;

use hirelens_core::{parse_result_payload, JobId, ResultPayload, StartJobRequest};
use hirelens_logging::{lens_debug, lens_info};
use reqwest::{Client, Response, Url};
use serde_json::Value;

use crate::types::StartJobResponse;
use crate::{ApiError, JobRecord};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// REST endpoints of the job backend.
#[async_trait::async_trait]
pub trait JobsApi: Send + Sync {
    async fn start_job(&self, request: &StartJobRequest) -> Result<JobId, ApiError>;

    /// Returns the HTTP status of the accepted stop request.
    async fn stop_job(&self, job_id: &str) -> Result<u16, ApiError>;

    async fn list_jobs(&self) -> Result<Vec<JobRecord>, ApiError>;

    /// `None` when the backend has nothing for this job.
    async fn fetch_current_results(&self, job_id: &str)
        -> Result<Option<ResultPayload>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestJobsApi {
    settings: ApiSettings,
    client: Client,
}

impl ReqwestJobsApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let mut base = self.settings.base_url.trim_end_matches('/').to_string();
        base.push('/');
        Url::parse(&base)
            .and_then(|url| url.join(path))
            .map_err(|err| ApiError::InvalidUrl(format!("{}: {err}", self.settings.base_url)))
    }
}

#[async_trait::async_trait]
impl JobsApi for ReqwestJobsApi {
    async fn start_job(&self, request: &StartJobRequest) -> Result<JobId, ApiError> {
        let url = self.endpoint("api/startJob")?;
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: StartJobResponse = ensure_success(response)?
            .json()
            .await
            .map_err(map_reqwest_error)?;
        lens_info!("backend accepted job {} for query '{}'", body.job_id, request.query);
        Ok(body.job_id)
    }

    async fn stop_job(&self, job_id: &str) -> Result<u16, ApiError> {
        let url = self.endpoint("api/stopJob")?;
        let response = self
            .client
            .post(url)
            .json(&job_id)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = ensure_success(response)?.status().as_u16();
        lens_info!("stop request for job {} answered {}", job_id, status);
        Ok(status)
    }

    async fn list_jobs(&self) -> Result<Vec<JobRecord>, ApiError> {
        let url = self.endpoint("api/jobs")?;
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        ensure_success(response)?
            .json()
            .await
            .map_err(map_reqwest_error)
    }

    async fn fetch_current_results(
        &self,
        job_id: &str,
    ) -> Result<Option<ResultPayload>, ApiError> {
        let mut url = self.endpoint("init")?;
        url.query_pairs_mut().append_pair("jobId", job_id);
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        let text = ensure_success(response)?
            .text()
            .await
            .map_err(map_reqwest_error)?;
        if text.trim().is_empty() {
            lens_debug!("no stored results for job {}", job_id);
            return Ok(None);
        }
        let value: Value =
            serde_json::from_str(&text).map_err(|err| ApiError::Decode(err.to_string()))?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(parse_result_payload(&value)))
    }
}

fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::HttpStatus(status.as_u16()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    if err.is_decode() {
        return ApiError::Decode(err.to_string());
    }
    ApiError::Network(err.to_string())
}
