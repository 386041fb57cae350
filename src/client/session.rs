use std::mem;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::{
    validate, PredictTransport, PreviewHandle, PreviewRegistry, TransportError, TransportResponse,
    UploadFile,
};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::models::Prediction;

/// The chosen file together with its preview. Dropping it revokes the preview.
#[derive(Debug)]
pub struct Selection {
    file: UploadFile,
    preview: PreviewHandle,
}

impl Selection {
    pub fn file(&self) -> &UploadFile {
        &self.file
    }

    pub fn preview_url(&self) -> String {
        self.preview.url()
    }
}

#[derive(Debug, Default)]
pub enum SessionState {
    #[default]
    Idle,
    FileSelected {
        selection: Selection,
    },
    Submitting {
        selection: Selection,
    },
    Resolved {
        selection: Selection,
        prediction: Prediction,
    },
    Failed {
        error: ClientError,
        selection: Option<Selection>,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::FileSelected { .. } => "file-selected",
            SessionState::Submitting { .. } => "submitting",
            SessionState::Resolved { .. } => "resolved",
            SessionState::Failed { .. } => "failed",
        }
    }
}

/// One user's classification session.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    config: ClientConfig,
    previews: PreviewRegistry,
}

impl Session {
    pub fn new(config: ClientConfig, previews: PreviewRegistry) -> Self {
        Self {
            state: SessionState::Idle,
            config,
            previews,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn selection(&self) -> Option<&Selection> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::FileSelected { selection }
            | SessionState::Submitting { selection }
            | SessionState::Resolved { selection, .. } => Some(selection),
            SessionState::Failed { selection, .. } => selection.as_ref(),
        }
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        match &self.state {
            SessionState::Resolved { prediction, .. } => Some(prediction),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ClientError> {
        match &self.state {
            SessionState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, SessionState::Submitting { .. })
    }

    /// True whenever a file is held and nothing is in flight, so a result or
    /// a failure can be retried with the same file.
    pub fn can_submit(&self) -> bool {
        matches!(
            self.state,
            SessionState::FileSelected { .. }
                | SessionState::Resolved { .. }
                | SessionState::Failed {
                    selection: Some(_),
                    ..
                }
        )
    }

    /// File chosen through the picker. A refused file leaves the session
    /// `Failed` with no selection.
    pub fn select(&mut self, file: UploadFile) -> Result<(), ClientError> {
        if self.is_busy() {
            return Err(ClientError::Busy);
        }
        if let Err(err) = validate(&file, self.config.max_upload_bytes) {
            info!(name = %file.name, %err, "file refused");
            let error = ClientError::from(err);
            self.state = SessionState::Failed {
                error: error.clone(),
                selection: None,
            };
            return Err(error);
        }

        debug!(name = %file.name, size = file.size(), "file selected");
        let preview = self.previews.create();
        self.state = SessionState::FileSelected {
            selection: Selection { file, preview },
        };
        Ok(())
    }

    /// Drag-and-drop; only the first file counts and an empty drop is ignored.
    pub fn drop_files(&mut self, files: Vec<UploadFile>) -> Result<(), ClientError> {
        match files.into_iter().next() {
            Some(file) => self.select(file),
            None => Ok(()),
        }
    }

    /// Moves the held file into `Submitting`, dropping any earlier result
    /// or error.
    pub fn begin_submit(&mut self) -> Result<(), ClientError> {
        match mem::take(&mut self.state) {
            SessionState::FileSelected { selection }
            | SessionState::Resolved { selection, .. }
            | SessionState::Failed {
                selection: Some(selection),
                ..
            } => {
                self.state = SessionState::Submitting { selection };
                Ok(())
            }
            other => {
                let busy = matches!(other, SessionState::Submitting { .. });
                self.state = other;
                Err(if busy {
                    ClientError::Busy
                } else {
                    ClientError::NothingToSubmit
                })
            }
        }
    }

    /// Applies the gateway's answer to an in-flight submission.
    pub fn finish_submit(
        &mut self,
        outcome: Result<TransportResponse, TransportError>,
    ) -> Result<(), ClientError> {
        let selection = match mem::take(&mut self.state) {
            SessionState::Submitting { selection } => selection,
            other => {
                self.state = other;
                return Err(ClientError::NothingToSubmit);
            }
        };

        match interpret_response(outcome, &self.config.cold_start_hint) {
            Ok(prediction) => {
                info!(label = %prediction.prediction, confidence = ?prediction.confidence, "prediction received");
                self.state = SessionState::Resolved {
                    selection,
                    prediction,
                };
                Ok(())
            }
            Err(error) => {
                warn!(%error, "prediction failed");
                self.state = SessionState::Failed {
                    error: error.clone(),
                    selection: Some(selection),
                };
                Err(error)
            }
        }
    }

    pub async fn submit(&mut self, transport: &dyn PredictTransport) -> Result<(), ClientError> {
        self.begin_submit()?;
        let outcome = match &self.state {
            SessionState::Submitting { selection } => transport.send(&selection.file).await,
            _ => return Err(ClientError::NothingToSubmit),
        };
        self.finish_submit(outcome)
    }

    pub fn reset(&mut self) {
        debug!(from = self.state.name(), "session reset");
        self.state = SessionState::Idle;
    }
}

/// Turns a raw gateway answer into a prediction or a user-facing error.
pub fn interpret_response(
    outcome: Result<TransportResponse, TransportError>,
    cold_start_hint: &str,
) -> Result<Prediction, ClientError> {
    let response = outcome.map_err(|TransportError(cause)| ClientError::Network {
        hint: cold_start_hint.to_string(),
        cause,
    })?;
    let body: Option<Value> = serde_json::from_slice(&response.body).ok();

    if !(200..300).contains(&response.status) {
        let message = body
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| format!("Request failed with status {}", response.status));
        return Err(ClientError::Rejected {
            status: response.status,
            message,
        });
    }

    let body = body.ok_or(ClientError::MalformedResponse)?;
    serde_json::from_value(body).map_err(|_| ClientError::MalformedResponse)
}

fn error_message(body: &Value) -> Option<String> {
    ["error", "details"]
        .iter()
        .find_map(|key| match body.get(key)? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
}
