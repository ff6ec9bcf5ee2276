//! Remote procedure client for recordsync.
//!
//! Every server operation is a named [`Procedure`] (`resource.action`).
//! Reads return the page aggregate; mutations take a
//! [`ValidRecord`](recordsync_model::ValidRecord) and return the server's
//! authoritative record.
//!
//! # Error shape
//!
//! Failures are split so callers can route them to the right place:
//! - [`RpcError::Validation`]: the server re-validated the payload and
//!   rejected specific fields
//! - [`RpcError::Transport`]: the server could not be reached, timed out,
//!   reported a conflict, or failed unexpectedly; not tied to any field
//!
//! Clients never retry. A failure is reported once and the caller decides
//! what happens next.

pub mod client;
mod error;
pub mod http;
pub mod mock;
mod procedure;

pub use client::{MutationResult, RemoteProcedureClient};
pub use error::{RpcError, RpcResult, TransportError};
pub use http::{HttpClientConfig, HttpProcedureClient};
pub use procedure::Procedure;
