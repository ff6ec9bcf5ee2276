//! A scripted client for tests.
//!
//! Responses are queued per procedure and handed out in order. Every call
//! is recorded before it waits for a response, so a test can observe an
//! in-flight call. A gated client holds each mutation until the test
//! releases it.

use crate::client::{MutationResult, RemoteProcedureClient};
use crate::error::{RpcResult, TransportError};
use crate::procedure::Procedure;
use async_trait::async_trait;
use recordsync_model::{Record, ValidRecord};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

/// Which kind of call was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Query,
    Mutation,
}

/// A call observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub procedure: Procedure,
    pub kind: CallKind,
    /// The mutation payload; `None` for queries.
    pub payload: Option<Record>,
}

/// Releases held mutations of a gated [`MockProcedureClient`].
#[derive(Debug, Clone)]
pub struct MockGate(Arc<Semaphore>);

impl MockGate {
    /// Lets one held mutation proceed.
    pub fn release(&self) {
        self.0.add_permits(1);
    }
}

/// A [`RemoteProcedureClient`] that replays queued responses.
#[derive(Debug, Default)]
pub struct MockProcedureClient {
    queries: Mutex<HashMap<Procedure, VecDeque<RpcResult<Value>>>>,
    mutations: Mutex<HashMap<Procedure, VecDeque<MutationResult>>>,
    calls: Mutex<Vec<RecordedCall>>,
    gate: Option<Arc<Semaphore>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockProcedureClient {
    /// Creates a mock that answers immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock whose mutations wait for [`MockGate::release`].
    pub fn gated() -> (Self, MockGate) {
        let semaphore = Arc::new(Semaphore::new(0));
        let mock = Self {
            gate: Some(semaphore.clone()),
            ..Self::default()
        };
        (mock, MockGate(semaphore))
    }

    /// Queues the next answer for a read procedure.
    pub fn push_query(&self, procedure: &Procedure, result: RpcResult<Value>) {
        lock(&self.queries)
            .entry(procedure.clone())
            .or_default()
            .push_back(result);
    }

    /// Queues the next answer for a mutation.
    pub fn push_mutation(&self, procedure: &Procedure, result: MutationResult) {
        lock(&self.mutations)
            .entry(procedure.clone())
            .or_default()
            .push_back(result);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Number of mutation calls made so far.
    pub fn mutation_count(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.kind == CallKind::Mutation)
            .count()
    }

    /// Number of query calls made so far.
    pub fn query_count(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.kind == CallKind::Query)
            .count()
    }

    fn unscripted(procedure: &Procedure) -> TransportError {
        TransportError::Network(format!("no scripted response for {procedure}"))
    }
}

#[async_trait]
impl RemoteProcedureClient for MockProcedureClient {
    async fn query(&self, procedure: &Procedure) -> RpcResult<Value> {
        lock(&self.calls).push(RecordedCall {
            procedure: procedure.clone(),
            kind: CallKind::Query,
            payload: None,
        });
        let next = lock(&self.queries)
            .get_mut(procedure)
            .and_then(VecDeque::pop_front);
        next.unwrap_or_else(|| Err(Self::unscripted(procedure).into()))
    }

    async fn mutate(&self, procedure: &Procedure, payload: &ValidRecord) -> MutationResult {
        lock(&self.calls).push(RecordedCall {
            procedure: procedure.clone(),
            kind: CallKind::Mutation,
            payload: Some(payload.as_record().clone()),
        });

        if let Some(gate) = &self.gate {
            match gate.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => return Err(TransportError::Network("gate closed".into()).into()),
            }
        }

        let next = lock(&self.mutations)
            .get_mut(procedure)
            .and_then(VecDeque::pop_front);
        next.unwrap_or_else(|| Err(Self::unscripted(procedure).into()))
    }
}
