//! Invoice use-case service.
//!
//! # Responsibility
//! - Provide stable create/get entry points for invoice callers.
//! - Loads take a `ConnectionScope`; creates go through an `InvoiceRepository`.
//! - Emit metadata-only `invoice_persist` / `invoice_load` log events.
//!
//! # Invariants
//! - Service APIs never bypass repository validation or transaction scope.
//! - Log lines carry ids, counts and durations only, never item contents.

use crate::db::ConnectionScope;
use crate::model::document::DocumentId;
use crate::model::invoice::{InvoiceEntryId, InvoiceRecord};
use crate::repo::document_repo::RepoResult;
use crate::repo::invoice_repo::{fetch_invoice, InvoiceRepository};
use log::{info, warn};
use std::time::Instant;

/// Use-case service wrapper for invoice persistence.
pub struct InvoiceService<R: InvoiceRepository> {
    repo: R,
}

impl<R: InvoiceRepository> InvoiceService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists a new invoice with all of its lines.
    ///
    /// Returns repository errors unchanged; on error the record keeps the
    /// identities it had before the call.
    pub fn create_invoice(&mut self, invoice: &mut InvoiceRecord) -> RepoResult<InvoiceEntryId> {
        let started_at = Instant::now();
        let line_count = invoice.items().len();

        match self.repo.persist(invoice) {
            Ok(entry_id) => {
                info!(
                    "event=invoice_persist module=service status=ok document_id={} entry_id={} lines={} duration_ms={}",
                    invoice.document_id().unwrap_or_default(),
                    entry_id,
                    line_count,
                    started_at.elapsed().as_millis()
                );
                Ok(entry_id)
            }
            Err(err) => {
                warn!(
                    "event=invoice_persist module=service status=error lines={} duration_ms={} error_code={} error={}",
                    line_count,
                    started_at.elapsed().as_millis(),
                    err.error_code(),
                    err
                );
                Err(err)
            }
        }
    }
}

/// Loads the invoice filed under `document_id` through a connection scope.
///
/// A document without invoice data is returned with no entry id and no
/// lines rather than as an error.
pub fn get_invoice(
    scope: ConnectionScope<'_>,
    document_id: DocumentId,
) -> RepoResult<InvoiceRecord> {
    let started_at = Instant::now();

    match fetch_invoice(scope, document_id) {
        Ok(invoice) => {
            info!(
                "event=invoice_load module=service status=ok document_id={} owned_connection={} has_invoice={} lines={} duration_ms={}",
                document_id,
                scope.owns_connection(),
                invoice.entry_id().is_some(),
                invoice.items().len(),
                started_at.elapsed().as_millis()
            );
            Ok(invoice)
        }
        Err(err) => {
            warn!(
                "event=invoice_load module=service status=error document_id={} owned_connection={} duration_ms={} error_code={} error={}",
                document_id,
                scope.owns_connection(),
                started_at.elapsed().as_millis(),
                err.error_code(),
                err
            );
            Err(err)
        }
    }
}
