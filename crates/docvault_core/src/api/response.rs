//! Response envelope handed to whatever transport fronts the core.
//!
//! Storage failures collapse into the single `DB_EXCEPT` category with a
//! generic message; validation and reference-data failures keep their own
//! codes and a readable message.

use crate::repo::document_repo::RepoError;
use serde::Serialize;
use serde_json::{Map, Value};

pub const STATUS_OK: &str = "OK";
pub const STATUS_DB_EXCEPT: &str = "DB_EXCEPT";
pub const STATUS_DOCUMENT_TYPE_NOT_FOUND: &str = "DOCUMENT_TYPE_NOT_FOUND";
pub const STATUS_DOCUMENT_INVALID: &str = "DOCUMENT_INVALID";
pub const STATUS_DOCUMENT_ITEM_INVALID: &str = "DOCUMENT_ITEM_INVALID";
pub const STATUS_NOT_FOUND: &str = "NOT_FOUND";
pub const STATUS_ALREADY_EXISTS: &str = "ALREADY_EXISTS";
pub const STATUS_INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";

const DB_EXCEPT_MESSAGE: &str = "database exception";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseStatus {
    pub ok: bool,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    pub status: ResponseStatus,
    pub data: Map<String, Value>,
}

impl ResponseEnvelope {
    pub fn success() -> Self {
        Self {
            status: ResponseStatus {
                ok: true,
                code: STATUS_OK,
                message: String::new(),
            },
            data: Map::new(),
        }
    }

    pub fn failure(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus {
                ok: false,
                code,
                message: message.into(),
            },
            data: Map::new(),
        }
    }

    /// Maps a repository error onto its response category.
    pub fn from_repo_error(err: &RepoError) -> Self {
        if err.is_storage_failure() {
            return Self::failure(STATUS_DB_EXCEPT, DB_EXCEPT_MESSAGE);
        }

        let code = match err {
            RepoError::DocumentTypeNotFound(_) => STATUS_DOCUMENT_TYPE_NOT_FOUND,
            RepoError::DocumentInvalid(_) => STATUS_DOCUMENT_INVALID,
            RepoError::DocumentItemInvalid(_) => STATUS_DOCUMENT_ITEM_INVALID,
            RepoError::NotFound { .. } => STATUS_NOT_FOUND,
            RepoError::AlreadyPersisted { .. } => STATUS_ALREADY_EXISTS,
            _ => STATUS_INTERNAL_SERVER_ERROR,
        };
        Self::failure(code, err.to_string())
    }

    /// Adds one data entry.
    pub fn with_data(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    /// Serializes `value` under `key`, turning a serialization failure into
    /// an internal-error envelope.
    pub fn with_serialized(self, key: &str, value: &impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => self.with_data(key, value),
            Err(err) => Self::failure(
                STATUS_INTERNAL_SERVER_ERROR,
                format!("failed to serialize `{key}`: {err}"),
            ),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status.ok
    }

    /// Renders the envelope as a JSON document.
    pub fn to_json(&self) -> Value {
        // A struct of strings, bools and JSON values always serializes.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
