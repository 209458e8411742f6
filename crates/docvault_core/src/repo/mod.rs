//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for documents, items and
//!   invoices.
//! - Isolate SQL details from service orchestration and the API boundary.
//!
//! # Invariants
//! - Repository writes validate records before persistence.
//! - Repository APIs return semantic errors (`DocumentTypeNotFound`,
//!   `NotFound`, validation) in addition to storage errors.

pub mod document_repo;
pub mod invoice_repo;
pub mod item_repo;
mod schema;
