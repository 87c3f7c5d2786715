use serde::{Deserialize, Serialize};

/// Body row of an insert request. The store fills in `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNoteRow {
    pub text: String,
    pub completed: bool,
}

impl NewNoteRow {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }
}

/// Body of an update request touching only the completed flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedPatch {
    pub completed: bool,
}

/// Error body returned by PostgREST on a failed request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl ApiErrorBody {
    /// Human readable summary: message, then code, details and hint when
    /// present.
    pub fn summary(&self) -> String {
        let mut out = self.message.clone();
        if let Some(code) = &self.code {
            out.push_str(&format!(" (code {code})"));
        }
        if let Some(details) = &self.details {
            out.push_str(&format!(": {details}"));
        }
        if let Some(hint) = &self.hint {
            out.push_str(&format!(" (hint: {hint})"));
        }
        out
    }
}
