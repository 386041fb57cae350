use std::fmt;

use super::{Session, SessionState};

/// Everything the front-end shows for one session state.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub dropzone: bool,
    pub file_name: Option<String>,
    pub preview_url: Option<String>,
    pub submit_enabled: bool,
    pub submit_label: &'static str,
    pub busy: bool,
    pub badge: Option<String>,
    pub confidence: Option<String>,
    pub error: Option<String>,
    pub backend: String,
}

/// `0.8567` becomes `85.67% confidence`.
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.2}% confidence", confidence * 100.0)
}

pub fn render(session: &Session) -> View {
    let state = session.state();
    let busy = matches!(state, SessionState::Submitting { .. });
    let selection = session.selection();
    let prediction = session.prediction();

    View {
        dropzone: !busy,
        file_name: selection.map(|s| s.file().name.clone()),
        preview_url: selection.map(|s| s.preview_url()),
        submit_enabled: session.can_submit(),
        submit_label: if busy { "Predicting…" } else { "Predict" },
        busy,
        badge: prediction.map(|p| p.prediction.clone()),
        confidence: prediction.and_then(|p| p.confidence).map(format_confidence),
        error: session.error().map(|e| e.to_string()),
        backend: session.config().api_base.clone(),
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Image Classification")?;
        if self.dropzone {
            writeln!(f, "[ drop an image here or choose a file ]")?;
        }
        if let (Some(name), Some(url)) = (&self.file_name, &self.preview_url) {
            writeln!(f, "Preview: {name} ({url})")?;
        }
        let state = if self.submit_enabled { "" } else { " (disabled)" };
        writeln!(f, "[{}]{}", self.submit_label, state)?;
        if self.busy {
            writeln!(f, "Waiting for the inference service...")?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "Error: {error}")?;
        }
        if let Some(badge) = &self.badge {
            writeln!(f, "Prediction: [{badge}]")?;
            if let Some(confidence) = &self.confidence {
                writeln!(f, "{confidence}")?;
            }
        }
        write!(f, "Backend: {}", self.backend)
    }
}
