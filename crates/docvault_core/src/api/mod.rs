//! Boundary between invoice use-cases and an outer transport.
//!
//! Every endpoint returns a `ResponseEnvelope`; translating it into HTTP or
//! terminal output is left to the caller.

pub mod invoice;
pub mod response;
pub mod view;
