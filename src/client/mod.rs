//! Upload client: one image classification at a time, from selection to
//! rendered result.

mod preview;
mod render;
mod session;
mod transport;
mod upload;

pub use preview::{PreviewHandle, PreviewRegistry};
pub use render::{format_confidence, render, View};
pub use session::{interpret_response, Selection, Session, SessionState};
pub use transport::{HttpTransport, PredictTransport, TransportError, TransportResponse};
pub use upload::{guess_mime, validate, UploadFile};
