//! Generic document header shared by invoices, receipts and other documents.
//!
//! # Responsibility
//! - Hold the fields stored in the `documents` table.
//! - Validate header consistency before any write.
//!
//! # Invariants
//! - `id` is `None` until the `documents` row exists.
//! - `due_at` is never earlier than `issued_at` when both are set.
//! - Non-draft documents carry an `issued_at` timestamp.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identity of a row in `documents`, shared by every document kind.
pub type DocumentId = i64;

/// Identity of a row in `document_types`.
pub type DocumentTypeId = i64;

/// Lifecycle state stored in `documents.Status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Issued,
    Paid,
    Cancelled,
}

impl DocumentStatus {
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Issued => "issued",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "issued" => Some(Self::Issued),
            "paid" => Some(Self::Paid),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Header validation failure, surfaced as "document invalid" to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentValidationError {
    /// `due_at` is earlier than `issued_at`.
    DueBeforeIssue { issued_at: i64, due_at: i64 },
    /// A timestamp field holds a negative epoch value.
    NegativeTimestamp { field: &'static str, value: i64 },
    /// An institution reference is not a valid row id.
    InvalidInstitution { field: &'static str, value: i64 },
    /// Issued/paid documents need an issue date.
    MissingIssueDate(DocumentStatus),
}

impl Display for DocumentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DueBeforeIssue { issued_at, due_at } => write!(
                f,
                "due_at ({due_at}) must be greater than or equal to issued_at ({issued_at})"
            ),
            Self::NegativeTimestamp { field, value } => {
                write!(f, "{field} must not be negative, got {value}")
            }
            Self::InvalidInstitution { field, value } => {
                write!(f, "{field} must reference a positive id, got {value}")
            }
            Self::MissingIssueDate(status) => write!(
                f,
                "documents with status `{}` require issued_at",
                status.as_db_str()
            ),
        }
    }
}

impl Error for DocumentValidationError {}

/// Header record of the `documents` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Row id; assigned by storage on insert.
    pub id: Option<DocumentId>,
    /// Resolved from `document_types` by the owning document kind.
    pub document_type_id: Option<DocumentTypeId>,
    pub status: DocumentStatus,
    /// Unix epoch milliseconds.
    pub issued_at: Option<i64>,
    /// Unix epoch milliseconds.
    pub due_at: Option<i64>,
    pub provider_institution_id: Option<i64>,
    pub receiver_institution_id: Option<i64>,
    /// Set by storage; ignored on insert.
    pub created_at: Option<i64>,
}

impl Document {
    /// Creates an unsaved draft header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a header pointing at an existing `documents` row, ready to load.
    pub fn with_id(id: DocumentId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Validates header fields before persistence.
    ///
    /// # Errors
    /// - `DocumentValidationError` describing the first inconsistent field.
    pub fn validate(&self) -> Result<(), DocumentValidationError> {
        for (field, value) in [("issued_at", self.issued_at), ("due_at", self.due_at)] {
            if let Some(value) = value {
                if value < 0 {
                    return Err(DocumentValidationError::NegativeTimestamp { field, value });
                }
            }
        }

        if let (Some(issued_at), Some(due_at)) = (self.issued_at, self.due_at) {
            if due_at < issued_at {
                return Err(DocumentValidationError::DueBeforeIssue { issued_at, due_at });
            }
        }

        for (field, value) in [
            ("provider_institution_id", self.provider_institution_id),
            ("receiver_institution_id", self.receiver_institution_id),
        ] {
            if let Some(value) = value {
                if value <= 0 {
                    return Err(DocumentValidationError::InvalidInstitution { field, value });
                }
            }
        }

        if matches!(self.status, DocumentStatus::Issued | DocumentStatus::Paid)
            && self.issued_at.is_none()
        {
            return Err(DocumentValidationError::MissingIssueDate(self.status));
        }

        Ok(())
    }
}
