//! Domain model for documents, catalogue items and invoices.
//!
//! # Responsibility
//! - Define the records mapped onto `documents`, `items`, `invoices` and
//!   `document_items`.
//! - Own field-level validation so repositories can reject bad input before
//!   the first write.
//!
//! # Invariants
//! - Storage identities are `Option` and stay `None` until a row exists.

pub mod document;
pub mod invoice;
pub mod item;
pub mod line_item;
