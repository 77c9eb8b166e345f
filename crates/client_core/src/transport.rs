//! HTTP access to the generation and story rendering endpoints.

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use shared::{
    domain::SourceImage,
    error::ApiErrorBody,
    protocol::{
        GenerationResponse, StoryRequest, AUTHOR_FIELD, CREATE_STORY_PATH, GENERATE_PATH,
        IMAGE_FIELD, QUOTE_FIELD, TITLE_FIELD,
    },
};
use tracing::{info, warn};
use url::Url;

use crate::error::ApiError;

pub const GENERATION_FALLBACK_MESSAGE: &str = "server response error";
pub const EXPORT_FALLBACK_MESSAGE: &str = "failed to create the story image";

#[async_trait]
pub trait QuoteApi: Send + Sync {
    async fn generate(&self, image: &SourceImage) -> Result<GenerationResponse, ApiError>;
    async fn create_story(&self, request: &StoryRequest) -> Result<Vec<u8>, ApiError>;
}

/// Single-attempt multipart client. No retries and no timeout.
#[derive(Debug, Clone)]
pub struct HttpQuoteApi {
    http: Client,
    generate_url: Url,
    story_url: Url,
}

impl HttpQuoteApi {
    pub fn new(server_url: &str) -> Result<Self, url::ParseError> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self, url::ParseError> {
        let base = server_url.trim_end_matches('/');
        Ok(Self {
            http,
            generate_url: Url::parse(&format!("{base}{GENERATE_PATH}"))?,
            story_url: Url::parse(&format!("{base}{CREATE_STORY_PATH}"))?,
        })
    }

    pub fn generate_url(&self) -> &Url {
        &self.generate_url
    }

    pub fn story_url(&self) -> &Url {
        &self.story_url
    }

    async fn post(&self, url: &Url, form: Form) -> Result<Response, ApiError> {
        self.http
            .post(url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::Transport)
    }
}

fn image_part(image: &SourceImage) -> Result<Part, ApiError> {
    Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.mime_type)
        .map_err(ApiError::Transport)
}

/// Builds the error for a non-2xx response, preferring the server's own message.
async fn rejection(response: Response, fallback: &str) -> ApiError {
    let status = response.status().as_u16();
    let message = match response.bytes().await {
        Ok(body) => ApiErrorBody::parse_message(&body),
        Err(e) => {
            warn!(status, error = %e, "failed to read error body");
            None
        }
    }
    .unwrap_or_else(|| fallback.to_string());

    warn!(status, %message, "server rejected request");
    ApiError::Rejected { status, message }
}

#[async_trait]
impl QuoteApi for HttpQuoteApi {
    async fn generate(&self, image: &SourceImage) -> Result<GenerationResponse, ApiError> {
        info!(
            url = %self.generate_url,
            size_bytes = image.size_bytes(),
            "requesting generation"
        );
        let form = Form::new().part(IMAGE_FIELD, image_part(image)?);
        let response = self.post(&self.generate_url, form).await?;

        if !response.status().is_success() {
            return Err(rejection(response, GENERATION_FALLBACK_MESSAGE).await);
        }

        let body = response.bytes().await.map_err(ApiError::Transport)?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn create_story(&self, request: &StoryRequest) -> Result<Vec<u8>, ApiError> {
        info!(
            url = %self.story_url,
            size_bytes = request.image.size_bytes(),
            "requesting story image"
        );
        let form = Form::new()
            .part(IMAGE_FIELD, image_part(&request.image)?)
            .text(QUOTE_FIELD, request.quote.clone())
            .text(AUTHOR_FIELD, request.author.clone())
            .text(TITLE_FIELD, request.title.clone());
        let response = self.post(&self.story_url, form).await?;

        if !response.status().is_success() {
            return Err(rejection(response, EXPORT_FALLBACK_MESSAGE).await);
        }

        let blob = response.bytes().await.map_err(ApiError::Transport)?;
        Ok(blob.to_vec())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
