//! Core data access for the document store.
//! Maps invoices, their line items and catalogue items onto SQLite tables.

pub mod api;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use api::invoice::{invoice_create, invoice_show, INVOICE_DOCUMENT_TAG};
pub use api::response::{ResponseEnvelope, ResponseStatus};
pub use api::view::{InvoiceView, LineItemView};
pub use config::CoreConfig;
pub use db::ConnectionScope;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::document::{
    Document, DocumentId, DocumentStatus, DocumentTypeId, DocumentValidationError,
};
pub use model::invoice::{InvoiceEntryId, InvoiceRecord, ReceiptEntryId, INVOICE_DOCUMENT_TYPE};
pub use model::item::{Item, ItemId, ItemValidationError, DEFAULT_ITEM_CURRENCY};
pub use model::line_item::{LineItem, LineItemCollection};
pub use repo::document_repo::{DocumentRepository, RepoError, RepoResult, SqliteDocumentRepository};
pub use repo::invoice_repo::{fetch_invoice, InvoiceRepository, SqliteInvoiceRepository};
pub use repo::item_repo::{ItemRepository, SqliteItemRepository};
pub use service::invoice_service::{get_invoice, InvoiceService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
