//! Invoice endpoints of the API boundary.
//!
//! # Responsibility
//! - Run invoice use-cases and translate their results into envelopes.
//! - Keep storage failures inside the envelope; nothing here panics or
//!   exits on a failed call.

use crate::api::response::ResponseEnvelope;
use crate::api::view::InvoiceView;
use crate::db::ConnectionScope;
use crate::model::document::DocumentId;
use crate::model::invoice::InvoiceRecord;
use crate::repo::invoice_repo::SqliteInvoiceRepository;
use crate::service::invoice_service::{get_invoice, InvoiceService};
use log::warn;
use rusqlite::Connection;

/// `documentType` tag of invoice payloads.
pub const INVOICE_DOCUMENT_TAG: &str = "invoice";

/// Loads one invoice and renders it as `{ documentType, document }`.
pub fn invoice_show(scope: ConnectionScope<'_>, document_id: DocumentId) -> ResponseEnvelope {
    match get_invoice(scope, document_id) {
        Ok(invoice) => ResponseEnvelope::success()
            .with_data("documentType", INVOICE_DOCUMENT_TAG)
            .with_serialized("document", &InvoiceView::from_record(&invoice)),
        Err(err) => {
            warn!(
                "event=api_invoice_show module=api status=error document_id={} error_code={}",
                document_id,
                err.error_code()
            );
            ResponseEnvelope::from_repo_error(&err)
        }
    }
}

/// Persists a new invoice and reports its document and entry ids.
pub fn invoice_create(conn: &mut Connection, invoice: &mut InvoiceRecord) -> ResponseEnvelope {
    let repo = match SqliteInvoiceRepository::try_new(conn) {
        Ok(repo) => repo,
        Err(err) => {
            warn!(
                "event=api_invoice_create module=api status=error error_code={}",
                err.error_code()
            );
            return ResponseEnvelope::from_repo_error(&err);
        }
    };
    let mut service = InvoiceService::new(repo);

    match service.create_invoice(invoice) {
        Ok(entry_id) => ResponseEnvelope::success()
            .with_data("documentType", INVOICE_DOCUMENT_TAG)
            .with_data("documentId", invoice.document_id())
            .with_data("entryId", entry_id),
        Err(err) => ResponseEnvelope::from_repo_error(&err),
    }
}
