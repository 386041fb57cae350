#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpResponse, HttpServer};
use classify_gateway::config::GatewayConfig;
use classify_gateway::handlers::AppState;
use futures_util::StreamExt;
use serde_json::json;

pub const BOUNDARY: &str = "classify-test-boundary";

/// How the stand-in inference service answers `/predict`.
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// `{"prediction":"Fake","confidence":0.93}`
    Classify,
    /// Fixed status and raw JSON body.
    Raw(u16, &'static str),
    /// Describes the file it received.
    Echo,
    /// Classifies after two seconds.
    Slow,
    /// Classifies; the root answers with plain text.
    TextRoot,
    /// Classifies; the root answers 500.
    BrokenRoot,
}

pub struct FakeUpstream {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl FakeUpstream {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

pub async fn spawn_upstream(behavior: Behavior) -> FakeUpstream {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(behavior))
            .app_data(web::Data::from(counter.clone()))
            .route("/predict", web::post().to(upstream_predict))
            .route("/", web::get().to(upstream_root))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind fake upstream");
    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());

    FakeUpstream {
        url: format!("http://{addr}"),
        hits,
    }
}

/// Runs the real gateway on an ephemeral port.
pub async fn spawn_gateway(config: GatewayConfig) -> SocketAddr {
    let state = web::Data::new(AppState::new(config).expect("gateway state"));
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(classify_gateway::routes)
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind gateway");
    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());
    addr
}

pub fn gateway_config(upstream_url: &str) -> GatewayConfig {
    GatewayConfig {
        upstream_url: upstream_url.to_string(),
        upstream_timeout: Duration::from_secs(5),
        ..GatewayConfig::default()
    }
}

/// One multipart part.
pub struct FormPart<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> FormPart<'a> {
    pub fn file(filename: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        Self {
            name: "file",
            filename: Some(filename),
            content_type: Some(content_type),
            data,
        }
    }
}

/// Returns the `Content-Type` header value and the encoded body.
pub fn multipart_body(parts: &[FormPart<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(filename) = part.filename {
            disposition.push_str(&format!("; filename=\"{filename}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

async fn upstream_predict(
    mut payload: Multipart,
    behavior: web::Data<Behavior>,
    hits: web::Data<AtomicUsize>,
) -> HttpResponse {
    hits.fetch_add(1, Ordering::SeqCst);

    let mut received = None;
    while let Some(Ok(mut field)) = payload.next().await {
        let name = field.content_disposition().get_name().map(str::to_string);
        let filename = field
            .content_disposition()
            .get_filename()
            .map(str::to_string);
        let content_type = field.content_type().map(|m| m.to_string());
        let mut size = 0usize;
        while let Some(Ok(chunk)) = field.next().await {
            size += chunk.len();
        }
        if name.as_deref() == Some("file") {
            received = Some((filename, content_type, size));
        }
    }

    match *behavior.get_ref() {
        Behavior::Classify | Behavior::TextRoot | Behavior::BrokenRoot => HttpResponse::Ok().json(json!({
            "prediction": "Fake",
            "confidence": 0.93
        })),
        Behavior::Raw(status, body) => HttpResponse::build(
            StatusCode::from_u16(status).expect("valid status"),
        )
        .content_type("application/json")
        .body(body),
        Behavior::Echo => match received {
            Some((filename, content_type, size)) => HttpResponse::Ok().json(json!({
                "filename": filename,
                "content_type": content_type,
                "size": size
            })),
            None => HttpResponse::BadRequest().json(json!({ "error": "No file uploaded" })),
        },
        Behavior::Slow => {
            actix_rt::time::sleep(Duration::from_secs(2)).await;
            HttpResponse::Ok().json(json!({ "prediction": "Real" }))
        }
    }
}

async fn upstream_root(behavior: web::Data<Behavior>) -> HttpResponse {
    match *behavior.get_ref() {
        Behavior::TextRoot => HttpResponse::Ok()
            .content_type("text/plain")
            .body("inference up"),
        Behavior::BrokenRoot => {
            HttpResponse::InternalServerError().json(json!({ "error": "model not loaded" }))
        }
        _ => HttpResponse::Ok().json(json!({ "message": "Welcome to the Image Classification API!" })),
    }
}
