//! The remote procedure seam.
//!
//! Sessions talk to the server only through [`RemoteProcedureClient`],
//! which lets tests swap in [`MockProcedureClient`](crate::mock::MockProcedureClient).

use crate::error::RpcResult;
use crate::procedure::Procedure;
use async_trait::async_trait;
use recordsync_model::{Record, ValidRecord};
use serde_json::Value;

/// Outcome of a mutation: the server's record, or a structured error.
pub type MutationResult = RpcResult<Record>;

/// Sends requests to named server operations.
#[async_trait]
pub trait RemoteProcedureClient: Send + Sync {
    /// Runs a read procedure and returns its payload.
    async fn query(&self, procedure: &Procedure) -> RpcResult<Value>;

    /// Runs a mutation. Only validated payloads can be sent.
    async fn mutate(&self, procedure: &Procedure, payload: &ValidRecord) -> MutationResult;
}
