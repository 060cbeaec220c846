//! Types shared between the DocChat client crates: domain state, wire
//! protocol for the document/chat backend, and the API error envelope.

pub mod domain;
pub mod error;
pub mod protocol;
