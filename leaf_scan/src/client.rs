use crate::config::InferenceServiceConfig;
use crate::prediction::{PredictResponse, PredictionResult};
use crate::selection::{ImageReference, SelectionError};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, StatusCode,
};
use serde::Deserialize;
use std::{future::Future, time::Duration};
use thiserror::Error;
use tokio::time::timeout;
use tracing::instrument;

const FILE_FIELD: &str = "file";

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Cannot reach server at {base_url}. Check that the inference service is running and the base URL is correct.")]
    Transport {
        base_url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request timed out after {0:?}.")]
    Timeout(Duration),
    #[error("Server error {status}: {body}")]
    Server { status: u16, body: String },
    #[error("Could not parse the server response.")]
    Parse(String),
    #[error("Could not read the selected image: {0}")]
    Image(#[from] SelectionError),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn predict(&self, image: &ImageReference) -> Result<PredictionResult, InferenceError>;
}

#[derive(Debug, Deserialize)]
struct PingResponse {
    message: String,
}

#[derive(Debug, Clone)]
pub struct InferenceClient {
    http: Client,
    config: InferenceServiceConfig,
}

impl InferenceClient {
    pub fn new(config: InferenceServiceConfig) -> Result<Self, InferenceError> {
        let http = Client::builder().build().map_err(InferenceError::Client)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &InferenceServiceConfig {
        &self.config
    }

    #[instrument(skip(self), fields(base_url = %self.config.base_url))]
    pub async fn ping(&self) -> Result<String, InferenceError> {
        let ping = self.with_timeout(self.fetch_ping()).await?;
        tracing::info!(message = %ping.message, "inference service answered ping");
        Ok(ping.message)
    }

    async fn fetch_ping(&self) -> Result<PingResponse, InferenceError> {
        let response = self
            .http
            .get(self.config.get_ping_url())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.read_json(response).await
    }

    async fn upload(&self, image: &ImageReference) -> Result<PredictionResult, InferenceError> {
        let image_data = image.read_bytes().await?;
        let part = Part::bytes(image_data)
            .file_name(image.file_name().to_string())
            .mime_str(image.mime_type())
            .map_err(InferenceError::Client)?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .http
            .post(self.config.get_predict_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let body: PredictResponse = self.read_json(response).await?;
        Ok(body.into())
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, InferenceError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if status != StatusCode::OK {
            tracing::error!(status = status.as_u16(), body = %body, "inference service returned an error");
            return Err(InferenceError::Server {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, body = %body, "malformed inference response");
            InferenceError::Parse(e.to_string())
        })
    }

    async fn with_timeout<T>(
        &self,
        request: impl Future<Output = Result<T, InferenceError>>,
    ) -> Result<T, InferenceError> {
        let limit = self.config.get_timeout();
        match timeout(limit, request).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("Request timed out after {:?}", limit);
                Err(InferenceError::Timeout(limit))
            }
        }
    }

    fn transport_error(&self, source: reqwest::Error) -> InferenceError {
        tracing::error!("Failed to reach inference service: {:?}", source);
        InferenceError::Transport {
            base_url: self.config.base_url.clone(),
            source,
        }
    }
}

#[async_trait]
impl PredictionService for InferenceClient {
    #[instrument(skip(self, image), fields(file = image.file_name()))]
    async fn predict(&self, image: &ImageReference) -> Result<PredictionResult, InferenceError> {
        let result = self.with_timeout(self.upload(image)).await?;
        tracing::info!(
            class = %result.disease_class(),
            confidence = result.confidence(),
            "prediction received"
        );
        Ok(result)
    }
}
