//! Document header repository and the repository error taxonomy.
//!
//! # Responsibility
//! - Resolve document type ids from the `document_types` reference table.
//! - Insert and fetch rows of the generic `documents` table.
//! - Define `RepoError`, shared by every repository in this crate.
//!
//! # Invariants
//! - Write paths call `Document::validate()` before SQL mutations.
//! - Type lookup is case-insensitive on `document_types.Title`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::document::{
    Document, DocumentId, DocumentStatus, DocumentTypeId, DocumentValidationError,
};
use crate::model::item::ItemValidationError;
use crate::repo::schema::{ensure_connection_ready, TableSpec};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DOCUMENT_SELECT_SQL: &str = "SELECT
    ID,
    DocumentTypes_ID,
    Status,
    IssuedAt,
    DueAt,
    ProviderInstitutions_ID,
    ReceiverInstitutions_ID,
    CreatedAt
FROM documents";

const DOCUMENT_TABLES: &[TableSpec] = &[
    ("document_types", &["ID", "Title"]),
    (
        "documents",
        &[
            "ID",
            "DocumentTypes_ID",
            "Status",
            "IssuedAt",
            "DueAt",
            "ProviderInstitutions_ID",
            "ReceiverInstitutions_ID",
            "CreatedAt",
        ],
    ),
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for document, item and invoice persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Reference row missing from `document_types`; a configuration fault.
    DocumentTypeNotFound(String),
    /// Document header failed validation.
    DocumentInvalid(DocumentValidationError),
    /// A line or its item failed validation.
    DocumentItemInvalid(ItemValidationError),
    /// Storage failure from SQLite or schema bootstrap.
    Db(DbError),
    /// A referenced row does not exist.
    NotFound { entity: &'static str, id: i64 },
    /// Create was called on a record that already has a storage identity.
    AlreadyPersisted { entity: &'static str, id: i64 },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted into a valid record.
    InvalidData(String),
}

impl RepoError {
    /// Returns whether this error comes from the storage layer rather than
    /// from input validation or reference data.
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            Self::Db(_)
                | Self::UninitializedConnection { .. }
                | Self::MissingRequiredTable(_)
                | Self::MissingRequiredColumn { .. }
        )
    }

    /// Stable snake_case code used in log events.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DocumentTypeNotFound(_) => "document_type_not_found",
            Self::DocumentInvalid(_) => "document_invalid",
            Self::DocumentItemInvalid(_) => "document_item_invalid",
            Self::Db(_) => "db_failure",
            Self::NotFound { .. } => "not_found",
            Self::AlreadyPersisted { .. } => "already_persisted",
            Self::UninitializedConnection { .. } => "uninitialized_connection",
            Self::MissingRequiredTable(_) | Self::MissingRequiredColumn { .. } => "schema_mismatch",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DocumentTypeNotFound(title) => write!(f, "document type not found: `{title}`"),
            Self::DocumentInvalid(err) => write!(f, "document invalid: {err}"),
            Self::DocumentItemInvalid(err) => write!(f, "document item invalid: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::AlreadyPersisted { entity, id } => {
                write!(f, "{entity} already persisted with id {id}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "repository requires table `{table}`"),
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DocumentInvalid(err) => Some(err),
            Self::DocumentItemInvalid(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DocumentValidationError> for RepoError {
    fn from(value: DocumentValidationError) -> Self {
        Self::DocumentInvalid(value)
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::DocumentItemInvalid(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the generic document header.
pub trait DocumentRepository {
    /// Looks up a document type id by title, ignoring case.
    fn find_document_type_id(&self, title: &str) -> RepoResult<Option<DocumentTypeId>>;
    /// Inserts one `documents` row under the given type and returns its id.
    fn insert_document(
        &self,
        document: &Document,
        document_type_id: DocumentTypeId,
    ) -> RepoResult<DocumentId>;
    /// Fetches one `documents` row by id.
    fn get_document(&self, id: DocumentId) -> RepoResult<Option<Document>>;
}

/// SQLite-backed document header repository.
///
/// Accepts any `&Connection`, including a `Transaction` through deref, so
/// callers can run header writes inside a wider unit of work.
pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, DOCUMENT_TABLES)?;
        Ok(Self { conn })
    }

    /// Constructs a repository without schema checks, for callers that
    /// already verified the connection.
    pub(crate) fn new_unchecked(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn find_document_type_id(&self, title: &str) -> RepoResult<Option<DocumentTypeId>> {
        let id = self
            .conn
            .query_row(
                "SELECT ID
                 FROM document_types
                 WHERE LOWER(Title) = LOWER(?1)
                 ORDER BY ID ASC
                 LIMIT 1;",
                [title],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn insert_document(
        &self,
        document: &Document,
        document_type_id: DocumentTypeId,
    ) -> RepoResult<DocumentId> {
        if let Some(id) = document.id {
            return Err(RepoError::AlreadyPersisted {
                entity: "document",
                id,
            });
        }
        document.validate()?;

        self.conn.execute(
            "INSERT INTO documents (
                DocumentTypes_ID,
                Status,
                IssuedAt,
                DueAt,
                ProviderInstitutions_ID,
                ReceiverInstitutions_ID
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                document_type_id,
                document.status.as_db_str(),
                document.issued_at,
                document.due_at,
                document.provider_institution_id,
                document.receiver_institution_id,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_document(&self, id: DocumentId) -> RepoResult<Option<Document>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DOCUMENT_SELECT_SQL} WHERE ID = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_document_row(row)?));
        }
        Ok(None)
    }
}

fn parse_document_row(row: &Row<'_>) -> RepoResult<Document> {
    let id: DocumentId = row.get("ID")?;
    let status_text: String = row.get("Status")?;
    let status = DocumentStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in documents.Status for document {id}"
        ))
    })?;

    Ok(Document {
        id: Some(id),
        document_type_id: Some(row.get("DocumentTypes_ID")?),
        status,
        issued_at: row.get("IssuedAt")?,
        due_at: row.get("DueAt")?,
        provider_institution_id: row.get("ProviderInstitutions_ID")?,
        receiver_institution_id: row.get("ReceiverInstitutions_ID")?,
        created_at: row.get("CreatedAt")?,
    })
}
