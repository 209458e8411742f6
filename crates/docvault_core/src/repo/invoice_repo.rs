//! Invoice repository: multi-table persist and load of `InvoiceRecord`.
//!
//! # Responsibility
//! - Create the `documents`, `invoices` and `document_items` rows of a new
//!   invoice in one transaction.
//! - Rebuild the full invoice graph (header, receipt link, lines, items)
//!   from an existing document id.
//!
//! # Invariants
//! - Persist resolves the `Invoice` document type before anything else and
//!   validates the header and every line before the first write.
//! - Persist is all-or-nothing; identities are written back to the record
//!   only after commit.
//! - Load is read-only. A document without an `invoices` row loads as a bare
//!   header with no entry id and no lines.
//! - The receipt link is chased `invoices.Receipts_ID -> receipts.Documents_ID`
//!   and never written back from here.

use crate::db::ConnectionScope;
use crate::model::document::DocumentId;
use crate::model::invoice::{
    InvoiceEntryId, InvoiceRecord, ReceiptEntryId, INVOICE_DOCUMENT_TYPE,
};
use crate::model::line_item::{LineItem, LineItemCollection};
use crate::repo::document_repo::{
    DocumentRepository, RepoError, RepoResult, SqliteDocumentRepository,
};
use crate::repo::item_repo::{ItemRepository, SqliteItemRepository};
use crate::repo::schema::{ensure_connection_ready, TableSpec};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

const INVOICE_TABLES: &[TableSpec] = &[
    ("document_types", &["ID", "Title"]),
    ("documents", &["ID", "DocumentTypes_ID"]),
    ("invoices", &["ID", "Documents_ID", "Receipts_ID"]),
    ("receipts", &["ID", "Documents_ID"]),
    ("items", &["ID", "ProductCode"]),
    ("document_items", &["ID", "Invoices_ID", "Items_ID", "Quantity"]),
];

/// Repository interface for invoice documents.
pub trait InvoiceRepository {
    /// Persists a new invoice and returns its entry id.
    ///
    /// On success the record carries its document id, entry id and the
    /// storage identity of every line item.
    fn persist(&mut self, invoice: &mut InvoiceRecord) -> RepoResult<InvoiceEntryId>;
    /// Populates `invoice` from storage using its preset document id.
    fn load(&self, invoice: &mut InvoiceRecord) -> RepoResult<()>;

    /// Loads the invoice filed under `document_id`.
    fn load_by_document_id(&self, document_id: DocumentId) -> RepoResult<InvoiceRecord> {
        let mut invoice = InvoiceRecord::for_document(document_id);
        self.load(&mut invoice)?;
        Ok(invoice)
    }
}

/// SQLite-backed invoice repository.
///
/// Holds the connection mutably because persist opens a transaction on it.
pub struct SqliteInvoiceRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteInvoiceRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, INVOICE_TABLES)?;
        Ok(Self { conn })
    }
}

impl InvoiceRepository for SqliteInvoiceRepository<'_> {
    fn persist(&mut self, invoice: &mut InvoiceRecord) -> RepoResult<InvoiceEntryId> {
        persist_invoice(self.conn, invoice)
    }

    fn load(&self, invoice: &mut InvoiceRecord) -> RepoResult<()> {
        load_invoice(self.conn, invoice)
    }
}

/// Loads the invoice filed under `document_id` through a connection scope.
///
/// Use `ConnectionScope::Reuse` when several related loads share one
/// connection; `ConnectionScope::Open` opens and releases one for this call.
pub fn fetch_invoice(
    scope: ConnectionScope<'_>,
    document_id: DocumentId,
) -> RepoResult<InvoiceRecord> {
    scope.run(|conn| {
        ensure_connection_ready(conn, INVOICE_TABLES)?;
        let mut invoice = InvoiceRecord::for_document(document_id);
        load_invoice(conn, &mut invoice)?;
        Ok(invoice)
    })
}

fn persist_invoice(
    conn: &mut Connection,
    invoice: &mut InvoiceRecord,
) -> RepoResult<InvoiceEntryId> {
    if let Some(id) = invoice.entry_id() {
        return Err(RepoError::AlreadyPersisted {
            entity: "invoice",
            id,
        });
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let documents = SqliteDocumentRepository::new_unchecked(&tx);
    let items = SqliteItemRepository::new_unchecked(&tx);

    let document_type_id = documents
        .find_document_type_id(INVOICE_DOCUMENT_TYPE)?
        .ok_or_else(|| RepoError::DocumentTypeNotFound(INVOICE_DOCUMENT_TYPE.to_string()))?;

    invoice.document().validate()?;
    for line in invoice.items() {
        line.validate()?;
    }

    let document_id = documents.insert_document(invoice.document(), document_type_id)?;

    tx.execute(
        "INSERT INTO invoices (Documents_ID, Receipts_ID) VALUES (?1, ?2);",
        params![document_id, invoice.receipt_entry_id()],
    )?;
    let entry_id = tx.last_insert_rowid();

    let mut lines = LineItemCollection::new();
    for line in invoice.items() {
        let item = items.ensure_item(&line.item)?;
        let item_id = item.id.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "item `{}` has no id after ensure",
                item.product_code
            ))
        })?;
        tx.execute(
            "INSERT INTO document_items (Invoices_ID, Items_ID, Quantity) VALUES (?1, ?2, ?3);",
            params![entry_id, item_id, line.quantity],
        )?;
        lines.add_item(item, line.quantity);
    }

    let receipt_document_id = match invoice.receipt_entry_id() {
        Some(receipt_entry_id) => Some(receipt_document_id(&tx, receipt_entry_id)?),
        None => None,
    };

    tx.commit()?;

    invoice
        .set_document_id(Some(document_id))
        .set_entry_id(Some(entry_id))
        .set_receipt_document_id(receipt_document_id)
        .set_items(lines);
    invoice.document_mut().document_type_id = Some(document_type_id);

    Ok(entry_id)
}

fn load_invoice(conn: &Connection, invoice: &mut InvoiceRecord) -> RepoResult<()> {
    let document_id = invoice.document_id().ok_or_else(|| {
        RepoError::InvalidData("invoice load requires a document id".to_string())
    })?;

    let documents = SqliteDocumentRepository::new_unchecked(conn);
    let document = documents
        .get_document(document_id)?
        .ok_or(RepoError::NotFound {
            entity: "document",
            id: document_id,
        })?;
    *invoice.document_mut() = document;

    let row: Option<(InvoiceEntryId, Option<ReceiptEntryId>)> = conn
        .query_row(
            "SELECT ID, Receipts_ID FROM invoices WHERE Documents_ID = ?1;",
            [document_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((entry_id, receipt_entry_id)) = row else {
        invoice
            .set_entry_id(None)
            .set_receipt_entry_id(None)
            .set_receipt_document_id(None)
            .set_items(LineItemCollection::new());
        return Ok(());
    };

    let receipt_document_id = match receipt_entry_id {
        Some(receipt_entry_id) => Some(receipt_document_id(conn, receipt_entry_id)?),
        None => None,
    };

    let items = SqliteItemRepository::new_unchecked(conn);
    let mut stmt = conn.prepare(
        "SELECT Items_ID, Quantity
         FROM document_items
         WHERE Invoices_ID = ?1
         ORDER BY ID ASC;",
    )?;
    let mut rows = stmt.query([entry_id])?;
    let mut lines = Vec::new();
    while let Some(row) = rows.next()? {
        let item_id: i64 = row.get("Items_ID")?;
        let quantity: i64 = row.get("Quantity")?;
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|value| *value > 0)
            .ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid quantity `{quantity}` in document_items for invoice {entry_id}"
                ))
            })?;
        let item = items.get_item(item_id)?.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "document_items of invoice {entry_id} references missing item {item_id}"
            ))
        })?;
        lines.push(LineItem::new(item, quantity));
    }

    invoice
        .set_entry_id(Some(entry_id))
        .set_receipt_entry_id(receipt_entry_id)
        .set_receipt_document_id(receipt_document_id)
        .set_items(lines.into_iter().collect());
    Ok(())
}

fn receipt_document_id(
    conn: &Connection,
    receipt_entry_id: ReceiptEntryId,
) -> RepoResult<DocumentId> {
    conn.query_row(
        "SELECT Documents_ID FROM receipts WHERE ID = ?1;",
        [receipt_entry_id],
        |row| row.get(0),
    )
    .optional()?
    .ok_or(RepoError::NotFound {
        entity: "receipt",
        id: receipt_entry_id,
    })
}
