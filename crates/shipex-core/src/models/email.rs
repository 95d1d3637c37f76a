//! Email input model.

use serde::{Deserialize, Serialize};

/// A freight forwarding email, as read from the input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Stable email identifier (e.g. "EMAIL_007").
    pub id: String,

    /// Subject line.
    pub subject: String,

    /// Free-text body. All correction heuristics read from here; the
    /// body takes precedence over the subject throughout.
    pub body: String,
}

impl EmailMessage {
    /// Build an email message from owned parts.
    pub fn new(id: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}
