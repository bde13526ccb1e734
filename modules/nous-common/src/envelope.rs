use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of a capability call.
///
/// `Ok` means the primary path produced `data`. `Partial` means a degrade
/// path produced `data` (treat it as lower quality, not untrusted).
/// `Fallback` is used only by translation's empty-input short-circuit.
/// `Error` means `data` must not be treated as a primary signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Ok,
    Partial,
    Fallback,
    Error,
}

/// The uniform envelope every capability returns.
///
/// Constructed once per call and immutable afterwards. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiResponse<T> {
    pub status: ResponseStatus,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl<T> AiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: ResponseStatus::Ok,
            data: Some(data),
            errors: None,
            meta: None,
        }
    }

    pub fn partial(data: T, errors: Vec<String>) -> Self {
        Self {
            status: ResponseStatus::Partial,
            data: Some(data),
            errors: none_if_empty(errors),
            meta: None,
        }
    }

    pub fn fallback(data: T) -> Self {
        Self {
            status: ResponseStatus::Fallback,
            data: Some(data),
            errors: None,
            meta: None,
        }
    }

    pub fn error(errors: Vec<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            data: None,
            errors: none_if_empty(errors),
            meta: None,
        }
    }

    /// Error status that still carries a placeholder payload
    /// (e.g. an empty string or empty list).
    pub fn error_with_data(data: T, errors: Vec<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            data: Some(data),
            errors: none_if_empty(errors),
            meta: None,
        }
    }

    pub fn with_status(mut self, status: ResponseStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = if meta.is_empty() { None } else { Some(meta) };
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::Ok
    }
}

fn none_if_empty(errors: Vec<String>) -> Option<Vec<String>> {
    if errors.is_empty() {
        None
    } else {
        Some(errors)
    }
}
