use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::models::FileUpload;

pub const DEFAULT_FILENAME: &str = "image.jpg";
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Client for the inference service. One instance is shared by all workers.
#[derive(Debug, Clone)]
pub struct Upstream {
    client: reqwest::Client,
    base_url: String,
}

/// What the inference service answered, kept byte-for-byte.
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Upstream {
    pub fn new(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.upstream_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Re-wraps `upload` as a fresh multipart body and posts it once.
    pub async fn predict(&self, upload: FileUpload) -> Result<UpstreamReply, GatewayError> {
        let filename = upload
            .filename
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        let content_type = upload
            .content_type
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        debug!(%filename, %content_type, size = upload.bytes.len(), "forwarding upload");
        let part = Part::bytes(upload.bytes)
            .file_name(filename)
            .mime_str(&content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();
        if status >= 400 {
            warn!(status, "inference service rejected upload");
        }

        Ok(UpstreamReply {
            status,
            content_type,
            body,
        })
    }

    /// Fetches the upstream root document. Non-JSON bodies come back as a
    /// JSON string.
    pub async fn root(&self) -> Result<Value, String> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!(
                "upstream responded with status {}",
                status.as_u16()
            ));
        }
        let body = response.bytes().await.map_err(|e| e.to_string())?;
        Ok(serde_json::from_slice(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned())))
    }
}

impl UpstreamReply {
    pub fn into_response(self) -> HttpResponse {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        let content_type = self
            .content_type
            .unwrap_or_else(|| "application/json".to_string());
        HttpResponse::build(status)
            .content_type(content_type)
            .body(self.body)
    }
}
