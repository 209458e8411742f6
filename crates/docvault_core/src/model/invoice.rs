//! Invoice domain record.
//!
//! # Responsibility
//! - Compose a generic `Document` header with invoice-only fields.
//! - Carry the ordered line items that persist into `document_items`.
//!
//! # Invariants
//! - `entry_id` (row of `invoices`) lives in a separate identity space from
//!   the document id (row of `documents`).
//! - `entry_id` is only set after the `invoices` row has been committed, or
//!   when loading from storage.
//! - `receipt_document_id` is derived from `receipt_entry_id` by storage and
//!   is never written back through this record.

use crate::model::document::{Document, DocumentId};
use crate::model::item::Item;
use crate::model::line_item::LineItemCollection;

/// Identity of a row in `invoices`.
pub type InvoiceEntryId = i64;

/// Identity of a row in `receipts`.
pub type ReceiptEntryId = i64;

/// Title of the `document_types` row every invoice is filed under.
pub const INVOICE_DOCUMENT_TYPE: &str = "Invoice";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceRecord {
    document: Document,
    entry_id: Option<InvoiceEntryId>,
    receipt_entry_id: Option<ReceiptEntryId>,
    receipt_document_id: Option<DocumentId>,
    items: LineItemCollection,
}

impl InvoiceRecord {
    /// Creates an unsaved invoice with an empty draft header and no lines.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty record addressed at an existing document, ready to load.
    pub fn for_document(document_id: DocumentId) -> Self {
        Self::with_document(Document::with_id(document_id))
    }

    /// Creates an unsaved invoice with a prepared header.
    pub fn with_document(document: Document) -> Self {
        Self {
            document,
            ..Self::default()
        }
    }

    /// Appends a line; validation is deferred to persistence.
    pub fn add_item(&mut self, item: Item, quantity: u32) -> &mut Self {
        self.items.add_item(item, quantity);
        self
    }

    /// Appends a line with quantity 1.
    pub fn add_single_item(&mut self, item: Item) -> &mut Self {
        self.add_item(item, 1)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn document_id(&self) -> Option<DocumentId> {
        self.document.id
    }

    pub fn entry_id(&self) -> Option<InvoiceEntryId> {
        self.entry_id
    }

    pub fn receipt_entry_id(&self) -> Option<ReceiptEntryId> {
        self.receipt_entry_id
    }

    /// Document id of the linked receipt, resolved through `receipts`.
    pub fn receipt_document_id(&self) -> Option<DocumentId> {
        self.receipt_document_id
    }

    pub fn items(&self) -> &LineItemCollection {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut LineItemCollection {
        &mut self.items
    }

    pub fn set_document_id(&mut self, document_id: Option<DocumentId>) -> &mut Self {
        self.document.id = document_id;
        self
    }

    pub fn set_entry_id(&mut self, entry_id: Option<InvoiceEntryId>) -> &mut Self {
        self.entry_id = entry_id;
        self
    }

    pub fn set_receipt_entry_id(&mut self, receipt_entry_id: Option<ReceiptEntryId>) -> &mut Self {
        self.receipt_entry_id = receipt_entry_id;
        self
    }

    pub fn set_receipt_document_id(
        &mut self,
        receipt_document_id: Option<DocumentId>,
    ) -> &mut Self {
        self.receipt_document_id = receipt_document_id;
        self
    }

    pub fn set_items(&mut self, items: LineItemCollection) -> &mut Self {
        self.items = items;
        self
    }

    /// Returns whether both the `documents` and `invoices` rows are known.
    pub fn is_persisted(&self) -> bool {
        self.document.id.is_some() && self.entry_id.is_some()
    }
}
