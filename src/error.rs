use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::models::ErrorBody;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Failures the gateway answers itself. Upstream HTTP errors are relayed
/// instead and never show up here.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("No file uploaded")]
    NoFile,

    #[error("unreadable multipart body: {0}")]
    Multipart(String),

    #[error("file exceeds the {limit} byte upload limit")]
    FileTooLarge { limit: u64 },

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::NoFile | GatewayError::Multipart(_) => StatusCode::BAD_REQUEST,
            GatewayError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            GatewayError::NoFile => ErrorBody::new("No file uploaded"),
            GatewayError::Multipart(details) => {
                ErrorBody::new("No file uploaded").with_details(details.clone())
            }
            GatewayError::FileTooLarge { .. } => {
                ErrorBody::new("File too large").with_details(self.to_string())
            }
            GatewayError::Upstream(err) => {
                ErrorBody::new("Server error").with_details(err.to_string())
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Why a file was refused before anything went over the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please choose an image file (got {mime:?})")]
    NotAnImage { mime: String },

    #[error("File is too large ({size} bytes); the limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The gateway answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("The server returned an unexpected response")]
    MalformedResponse,

    #[error("{hint}")]
    Network { hint: String, cause: String },

    #[error("A prediction is already in progress")]
    Busy,

    #[error("Choose an image before pressing Predict")]
    NothingToSubmit,
}
