use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use tracing::{error, info, warn};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::models::{FileUpload, GatewayStatus, HealthResponse, RootResponse};
use crate::upstream::Upstream;

pub const FILE_FIELD: &str = "file";

pub struct AppState {
    pub config: GatewayConfig,
    pub upstream: Upstream,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let upstream = Upstream::new(&config)?;
        Ok(Self { config, upstream })
    }
}

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        service: state.config.service_name.clone(),
        flask_url: state.upstream.base_url().to_string(),
    })
}

pub async fn predict(
    mut payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, GatewayError> {
    let upload = match read_file(&mut payload, state.config.max_upload_bytes).await? {
        Some(upload) => upload,
        None => {
            warn!("predict called without a file");
            return Err(GatewayError::NoFile);
        }
    };

    info!(
        filename = upload.filename.as_deref().unwrap_or(""),
        size = upload.bytes.len(),
        "proxying prediction"
    );
    let reply = state.upstream.predict(upload).await.map_err(|e| {
        error!("Predict proxy error: {}", e);
        e
    })?;
    Ok(reply.into_response())
}

pub async fn root(state: web::Data<AppState>) -> HttpResponse {
    let flask = match state.upstream.root().await {
        Ok(body) => body,
        Err(details) => {
            warn!(%details, "inference service root unreachable");
            serde_json::json!({ "error": "unreachable", "details": details })
        }
    };
    HttpResponse::Ok().json(RootResponse {
        express: GatewayStatus {
            message: "Express proxy is up".to_string(),
        },
        flask,
    })
}

/// Returns the first `file` part, buffered in memory. Other parts are skipped.
async fn read_file(payload: &mut Multipart, limit: u64) -> Result<Option<FileUpload>, GatewayError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| GatewayError::Multipart(e.to_string()))?;
        if field.content_disposition().get_name() != Some(FILE_FIELD) {
            drain(&mut field).await?;
            continue;
        }

        let filename = field
            .content_disposition()
            .get_filename()
            .map(str::to_string);
        let content_type = field.content_type().map(|mime| mime.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| GatewayError::Multipart(e.to_string()))?;
            if (bytes.len() + data.len()) as u64 > limit {
                return Err(GatewayError::FileTooLarge { limit });
            }
            bytes.extend_from_slice(&data);
        }

        return Ok(Some(FileUpload {
            filename,
            content_type,
            bytes,
        }));
    }
    Ok(None)
}

async fn drain(field: &mut Field) -> Result<(), GatewayError> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| GatewayError::Multipart(e.to_string()))?;
    }
    Ok(())
}
