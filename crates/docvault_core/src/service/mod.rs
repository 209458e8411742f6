//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the API boundary and CLI decoupled from storage details.

pub mod invoice_service;
