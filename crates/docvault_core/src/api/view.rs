//! Outward representation of an invoice for response payloads.
//!
//! The linked receipt's document id is internal bookkeeping and is left out
//! unless the caller opts in through `InvoiceView::with_receipt_link`.

use crate::model::document::{DocumentId, DocumentStatus};
use crate::model::invoice::InvoiceRecord;
use crate::model::item::ItemId;
use crate::model::line_item::LineItem;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemView {
    pub item_id: Option<ItemId>,
    pub product_code: String,
    pub title: String,
    pub unit_price: i64,
    pub currency: String,
    pub quantity: u32,
}

impl From<&LineItem> for LineItemView {
    fn from(line: &LineItem) -> Self {
        Self {
            item_id: line.item.id,
            product_code: line.item.product_code.clone(),
            title: line.item.title.clone(),
            unit_price: line.item.unit_price,
            currency: line.item.currency.clone(),
            quantity: line.quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceView {
    pub id: Option<DocumentId>,
    pub status: DocumentStatus,
    pub issued_at: Option<i64>,
    pub due_at: Option<i64>,
    pub provider_institution_id: Option<i64>,
    pub receiver_institution_id: Option<i64>,
    pub created_at: Option<i64>,
    pub items: Vec<LineItemView>,
    /// `None` when line amounts overflow.
    pub total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_document_id: Option<DocumentId>,
}

impl InvoiceView {
    /// Builds the default representation, without the receipt link.
    pub fn from_record(invoice: &InvoiceRecord) -> Self {
        let document = invoice.document();
        Self {
            id: document.id,
            status: document.status,
            issued_at: document.issued_at,
            due_at: document.due_at,
            provider_institution_id: document.provider_institution_id,
            receiver_institution_id: document.receiver_institution_id,
            created_at: document.created_at,
            items: invoice.items().iter().map(LineItemView::from).collect(),
            total: invoice.items().total(),
            receipt_document_id: None,
        }
    }

    /// Adds the linked receipt's document id to the representation.
    pub fn with_receipt_link(mut self, invoice: &InvoiceRecord) -> Self {
        self.receipt_document_id = invoice.receipt_document_id();
        self
    }
}
