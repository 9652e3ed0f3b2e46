//! HTTP implementation of [`TutorBackend`].
//!
//! The explanation server handles classification, explanations and subject
//! selection; the video server renders animations and owns the animation
//! history that a session reset clears.

use std::path::PathBuf;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::api::{
    AnimateRequest, ExplanationResponse, MessageResponse, QuestionRequest, RouterResponse,
    SubjectRequest,
};
use crate::core::classification::ClassificationResult;
use crate::core::subject::Subject;
use crate::core::transport::{TransportError, TutorBackend};
use crate::core::video::VideoAsset;
use crate::utils::url::construct_api_url;

const TUNNEL_HEADER: &str = "ngrok-skip-browser-warning";
const MAX_ERROR_BODY_CHARS: usize = 300;

#[derive(Clone, Debug)]
pub struct BackendEndpoints {
    pub explain_url: String,
    pub video_url: String,
}

#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    endpoints: BackendEndpoints,
    video_dir: PathBuf,
}

impl HttpBackend {
    pub fn new(client: reqwest::Client, endpoints: BackendEndpoints, video_dir: PathBuf) -> Self {
        Self {
            client,
            endpoints,
            video_dir,
        }
    }

    fn post(&self, base_url: &str, endpoint: &str) -> reqwest::RequestBuilder {
        self.client
            .post(construct_api_url(base_url, endpoint))
            .header(TUNNEL_HEADER, "true")
    }

    async fn send(
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, TransportError> {
        let response = request
            .send()
            .await
            .map_err(|source| TransportError::Request { operation, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                operation,
                status: status.as_u16(),
                body: summarize_error_body(&body),
            });
        }

        Ok(response)
    }

    async fn post_json<B, R>(
        &self,
        operation: &'static str,
        base_url: &str,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<R, TransportError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = self.post(base_url, endpoint);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = Self::send(operation, request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| TransportError::Request { operation, source })?;

        serde_json::from_slice(&bytes).map_err(|err| TransportError::decode(operation, err.to_string()))
    }
}

#[async_trait]
impl TutorBackend for HttpBackend {
    async fn reset_session(&self) -> Result<(), TransportError> {
        let reply: MessageResponse = self
            .post_json::<(), _>("reset_session", &self.endpoints.video_url, "reset-history", None)
            .await?;
        info!(message = %reply.message, "session reset");
        Ok(())
    }

    async fn set_subject(&self, subject: Subject) -> Result<(), TransportError> {
        let reply: MessageResponse = self
            .post_json(
                "set_subject",
                &self.endpoints.explain_url,
                "api/set-subject",
                Some(&SubjectRequest { subject }),
            )
            .await?;
        info!(%subject, message = %reply.message, "subject selected");
        Ok(())
    }

    async fn classify(&self, question: &str) -> Result<ClassificationResult, TransportError> {
        let reply: RouterResponse = self
            .post_json(
                "classify",
                &self.endpoints.explain_url,
                "api/router_response",
                Some(&QuestionRequest { question }),
            )
            .await?;
        debug!(?reply.response, "classification received");
        Ok(reply.response.into())
    }

    async fn explain(&self, question: &str) -> Result<String, TransportError> {
        let reply: ExplanationResponse = self
            .post_json(
                "explain",
                &self.endpoints.explain_url,
                "api/llm_response",
                Some(&QuestionRequest { question }),
            )
            .await?;
        Ok(reply.llm_response)
    }

    async fn animate(&self, animation_spec: &str) -> Result<VideoAsset, TransportError> {
        const OPERATION: &str = "animate";

        let request = self
            .post(&self.endpoints.video_url, "generate-video")
            .json(&AnimateRequest {
                manim_prompt: animation_spec,
            });
        let response = Self::send(OPERATION, request).await?;

        let io_err = |source| TransportError::Io {
            operation: OPERATION,
            source,
        };
        // Dropping `temp_path` on any early return removes the partial file.
        let (file, temp_path) = VideoAsset::create_file(&self.video_dir)
            .map_err(io_err)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);
        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| TransportError::Request {
                operation: OPERATION,
                source,
            })?;
            file.write_all(&chunk).await.map_err(io_err)?;
            written += chunk.len() as u64;
        }
        file.sync_all().await.map_err(io_err)?;

        if written == 0 {
            return Err(TransportError::decode(OPERATION, "empty video payload"));
        }

        let asset = VideoAsset::from_temp_path(temp_path, written);
        debug!(asset = asset.id(), bytes = written, "video downloaded");
        Ok(asset)
    }
}

/// Reduce an error body to something fit for a log line. FastAPI reports
/// failures as `{"detail": ...}`; other servers use `message` or `error`.
fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    let summary = serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| {
            ["/detail", "/error/message", "/error", "/message"]
                .iter()
                .find_map(|pointer| value.pointer(pointer).and_then(|v| v.as_str()))
                .map(str::to_owned)
        })
        .unwrap_or_else(|| trimmed.to_string());

    let collapsed = summary.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > MAX_ERROR_BODY_CHARS {
        let cut: String = collapsed.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{cut}…")
    } else {
        collapsed
    }
}
