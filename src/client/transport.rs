use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use super::UploadFile;

/// Raw gateway answer, before the session interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// No HTTP response was received at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait PredictTransport: Send + Sync {
    async fn send(&self, file: &UploadFile) -> Result<TransportResponse, TransportError>;
}

/// Posts uploads to the gateway's `/predict` endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    predict_url: String,
}

impl HttpTransport {
    pub fn new(predict_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            predict_url: predict_url.into(),
        }
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }
}

#[async_trait]
impl PredictTransport for HttpTransport {
    async fn send(&self, file: &UploadFile) -> Result<TransportResponse, TransportError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime)
            .map_err(|e| TransportError(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.predict_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}
