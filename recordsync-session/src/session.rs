//! The edit session state machine.

use crate::binder::{FieldBinder, WidgetValue};
use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult, SubmitError};
use crate::state::SessionState;
use recordsync_cache::{Aggregate, CacheEntry, CacheStore};
use recordsync_model::{Record, SchemaValidator, ValidRecord, ValidationError};
use recordsync_rpc::{MutationResult, Procedure, RemoteProcedureClient, RpcError, TransportError};
use recordsync_types::{QueryKey, SessionId, SubKey};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Everything that identifies one editable section.
#[derive(Debug, Clone)]
pub struct SectionSpec {
    /// Cache key of the page aggregate.
    pub query_key: QueryKey,
    /// Read procedure that returns the aggregate.
    pub query: Procedure,
    /// The section's slot inside the aggregate.
    pub sub_key: SubKey,
    /// Write procedure for this section.
    pub mutation: Procedure,
    pub validator: SchemaValidator,
}

#[derive(Debug)]
struct Inner {
    state: SessionState,
    binder: FieldBinder,
    last_persisted: Record,
    field_errors: Vec<ValidationError>,
    banner: Option<TransportError>,
    submit_attempted: bool,
    /// A fetch landed in the cache while the draft was open.
    deferred_sync: bool,
}

/// Drives one section through view, edit and submit.
///
/// All methods take `&self`; the session can be shared behind an `Arc`
/// and observed while a submission is in flight. The internal lock is
/// never held across an await.
pub struct EditSession {
    id: SessionId,
    spec: SectionSpec,
    config: SessionConfig,
    client: Arc<dyn RemoteProcedureClient>,
    cache: CacheStore,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("id", &self.id)
            .field("sub_key", &self.spec.sub_key)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl EditSession {
    /// Creates a session in `Viewing`.
    ///
    /// The persisted value starts from the cached section if the aggregate
    /// is already cached, and from the schema defaults otherwise.
    pub fn new(
        spec: SectionSpec,
        client: Arc<dyn RemoteProcedureClient>,
        cache: CacheStore,
        config: SessionConfig,
    ) -> Self {
        let initial = cache
            .read_section(&spec.query_key, &spec.sub_key)
            .and_then(|value| Record::from_value(Value::clone(&value)).ok())
            .unwrap_or_else(|| spec.validator.schema().default_record());
        let id = SessionId::new();
        debug!("Created session {} for {}", id, spec.sub_key);
        Self {
            id,
            spec,
            config,
            client,
            cache,
            inner: Mutex::new(Inner {
                state: SessionState::Viewing,
                binder: FieldBinder::new(initial.clone()),
                last_persisted: initial,
                field_errors: Vec::new(),
                banner: None,
                submit_attempted: false,
                deferred_sync: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn spec(&self) -> &SectionSpec {
        &self.spec
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// A copy of the draft.
    pub fn values(&self) -> Record {
        self.lock().binder.get_values().clone()
    }

    /// One field of the draft by dotted path.
    pub fn value(&self, path: &str) -> Option<Value> {
        self.lock().binder.get_value(path).cloned()
    }

    /// The record as last acknowledged by the server or loaded from cache.
    pub fn last_persisted(&self) -> Record {
        self.lock().last_persisted.clone()
    }

    pub fn field_errors(&self) -> Vec<ValidationError> {
        self.lock().field_errors.clone()
    }

    /// The first error message for one field path.
    pub fn field_error(&self, path: &str) -> Option<String> {
        self.lock()
            .field_errors
            .iter()
            .find(|error| error.path == path)
            .map(|error| error.message.clone())
    }

    /// The last banner-level failure, if any.
    pub fn banner(&self) -> Option<TransportError> {
        self.lock().banner.clone()
    }

    /// Whether the draft differs from the persisted record.
    pub fn is_dirty(&self) -> bool {
        let inner = self.lock();
        inner.binder.is_dirty(&inner.last_persisted)
    }

    /// Populates the draft from the cache, fetching the aggregate first if
    /// it is not cached yet.
    ///
    /// Only applied while `Viewing`; an open draft is never overwritten.
    pub async fn load(&self) -> SessionResult<bool> {
        if !self.cache.contains(&self.spec.query_key) {
            fetch_aggregate(
                self.client.as_ref(),
                &self.cache,
                &self.spec.query_key,
                &self.spec.query,
                false,
            )
            .await?;
        }
        self.sync_from_cache()
    }

    /// Refetches the aggregate, replaces the cache entry and then behaves
    /// like [`load`](Self::load).
    pub async fn refresh(&self) -> SessionResult<bool> {
        fetch_aggregate(
            self.client.as_ref(),
            &self.cache,
            &self.spec.query_key,
            &self.spec.query,
            true,
        )
        .await?;
        self.sync_from_cache()
    }

    /// Copies the cached section into the draft and the persisted record.
    ///
    /// Returns whether anything was applied. Nothing is applied when the
    /// aggregate has no entry for this section. Outside `Viewing` the open
    /// draft is kept and the cached value is applied by the next `cancel`.
    pub fn sync_from_cache(&self) -> SessionResult<bool> {
        let Some(section) = self
            .cache
            .read_section(&self.spec.query_key, &self.spec.sub_key)
        else {
            debug!(
                "No cached section {} under {}",
                self.spec.sub_key, self.spec.query_key
            );
            return Ok(false);
        };
        let record = Record::from_value(Value::clone(&section))?;

        let mut inner = self.lock();
        if inner.state != SessionState::Viewing {
            debug!(
                "Session {} is {}, keeping the open draft",
                self.id, inner.state
            );
            inner.deferred_sync = true;
            return Ok(false);
        }
        inner.binder.reset(record.clone());
        inner.last_persisted = record;
        inner.deferred_sync = false;
        Ok(true)
    }

    /// The cached section as a record. A malformed section is logged and
    /// treated as absent.
    fn cached_record(&self) -> Option<Record> {
        let section = self
            .cache
            .read_section(&self.spec.query_key, &self.spec.sub_key)?;
        match Record::from_value(Value::clone(&section)) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Cached section {} is not a record: {}", self.spec.sub_key, e);
                None
            }
        }
    }

    /// `Viewing → Editing`. Clears errors and any banner.
    pub fn start_editing(&self) -> SessionResult<()> {
        let mut inner = self.lock();
        if inner.state != SessionState::Viewing {
            return Err(SessionError::InvalidTransition {
                state: inner.state,
                action: "start editing",
            });
        }
        let persisted = inner.last_persisted.clone();
        inner.binder.reset(persisted);
        inner.field_errors.clear();
        inner.banner = None;
        inner.submit_attempted = false;
        inner.state = SessionState::Editing;
        debug!("Session {} started editing", self.id);
        Ok(())
    }

    /// `Editing → Viewing`, discarding the draft.
    ///
    /// If the aggregate was fetched while the draft was open, the session
    /// returns to the fetched value rather than the pre-edit one.
    /// Rejected while `Submitting`; the outcome of a sent request is
    /// always reflected.
    pub fn cancel(&self) -> SessionResult<()> {
        let mut inner = self.lock();
        if inner.state != SessionState::Editing {
            return Err(SessionError::InvalidTransition {
                state: inner.state,
                action: "cancel",
            });
        }
        if inner.deferred_sync {
            if let Some(fresh) = self.cached_record() {
                debug!("Session {} applying deferred sync on cancel", self.id);
                inner.last_persisted = fresh;
            }
            inner.deferred_sync = false;
        }
        let persisted = inner.last_persisted.clone();
        inner.binder.reset(persisted);
        inner.field_errors.clear();
        inner.banner = None;
        inner.submit_attempted = false;
        inner.state = SessionState::Viewing;
        debug!("Session {} cancelled", self.id);
        Ok(())
    }

    /// Writes one draft field from a native input.
    pub fn set_value(&self, path: &str, value: impl Into<Value>) -> SessionResult<()> {
        let value = value.into();
        self.write(path, "set a value", |binder| binder.set_value(path, value))
    }

    /// Writes one draft field from a rich text editor or file picker.
    pub fn set_widget_value(&self, path: &str, value: WidgetValue) -> SessionResult<()> {
        self.write(path, "set a value", |binder| {
            binder.set_widget_value(path, value)
        })
    }

    fn write(
        &self,
        path: &str,
        action: &'static str,
        apply: impl FnOnce(&mut FieldBinder) -> recordsync_model::ModelResult<()>,
    ) -> SessionResult<()> {
        let mut inner = self.lock();
        if inner.state != SessionState::Editing {
            return Err(SessionError::InvalidTransition {
                state: inner.state,
                action,
            });
        }
        apply(&mut inner.binder)?;
        if self.config.revalidate_on_change && inner.submit_attempted {
            inner.field_errors = match self.spec.validator.validate(inner.binder.get_values()) {
                Ok(_) => Vec::new(),
                Err(errors) => errors,
            };
            debug!(
                "Revalidated {} after write to {}: {} error(s)",
                self.id,
                path,
                inner.field_errors.len()
            );
        }
        Ok(())
    }

    /// Validates the draft and sends it to the section's mutation.
    ///
    /// On success the server's record is patched into the cache under this
    /// section's sub-key and the session returns to `Viewing`. Any failure
    /// returns the session to `Editing` with the draft unchanged. If the
    /// returned future is dropped mid-flight the session also returns to
    /// `Editing`, with a banner.
    pub async fn submit(&self) -> Result<Record, SubmitError> {
        let payload = self.begin_submit()?;

        let mut in_flight = InFlight {
            session: self,
            settled: false,
        };
        let result = self.send(&payload).await;
        in_flight.settled = true;

        match result {
            Ok(record) => Ok(self.finish_success(record)),
            Err(RpcError::Validation { fields }) => {
                let mut inner = self.lock();
                inner.state = SessionState::Editing;
                inner.field_errors = fields.clone();
                debug!(
                    "Session {} rejected by server: {} field error(s)",
                    self.id,
                    fields.len()
                );
                Err(SubmitError::ServerValidation(fields))
            }
            Err(RpcError::Transport(error)) => {
                let mut inner = self.lock();
                inner.state = SessionState::Editing;
                inner.banner = Some(error.clone());
                warn!("Session {} submit failed: {}", self.id, error);
                Err(SubmitError::Transport(error))
            }
        }
    }

    fn begin_submit(&self) -> Result<ValidRecord, SubmitError> {
        let mut inner = self.lock();
        if inner.state != SessionState::Editing {
            return Err(SubmitError::InvalidState { state: inner.state });
        }
        inner.submit_attempted = true;
        inner.banner = None;
        match self.spec.validator.validate(inner.binder.get_values()) {
            Ok(valid) => {
                inner.field_errors.clear();
                inner.state = SessionState::Submitting;
                debug!(
                    "Session {} submitting to {}",
                    self.id, self.spec.mutation
                );
                Ok(valid)
            }
            Err(errors) => {
                debug!(
                    "Session {} draft invalid: {} error(s)",
                    self.id,
                    errors.len()
                );
                inner.field_errors = errors.clone();
                Err(SubmitError::ClientValidation(errors))
            }
        }
    }

    async fn send(&self, payload: &ValidRecord) -> MutationResult {
        let call = self.client.mutate(&self.spec.mutation, payload);
        match self.config.submit_timeout() {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout.into()),
            },
            None => call.await,
        }
    }

    fn finish_success(&self, record: Record) -> Record {
        let patched = self.cache.patch(
            &self.spec.query_key,
            &self.spec.sub_key,
            record.clone().into_value(),
        );
        if patched.is_none() {
            debug!(
                "Aggregate {} not cached, skipped patch of {}",
                self.spec.query_key, self.spec.sub_key
            );
        }

        let mut inner = self.lock();
        inner.binder.reset(record.clone());
        inner.last_persisted = record.clone();
        inner.field_errors.clear();
        inner.banner = None;
        inner.submit_attempted = false;
        inner.deferred_sync = false;
        inner.state = SessionState::Viewing;
        info!("Session {} saved {}", self.id, self.spec.sub_key);
        record
    }

    fn abandon(&self) {
        let mut inner = self.lock();
        if inner.state == SessionState::Submitting {
            inner.state = SessionState::Editing;
            inner.banner = Some(TransportError::Network("submission abandoned".into()));
            warn!("Session {} submission abandoned", self.id);
        }
    }
}

/// Returns the session to `Editing` if a submit future is dropped before
/// its call settles.
struct InFlight<'a> {
    session: &'a EditSession,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.session.abandon();
        }
    }
}

/// Fetches an aggregate and stores it. `replace` forces a new snapshot;
/// otherwise an entry cached in the meantime wins.
pub(crate) async fn fetch_aggregate(
    client: &dyn RemoteProcedureClient,
    cache: &CacheStore,
    key: &QueryKey,
    query: &Procedure,
    replace: bool,
) -> SessionResult<Arc<CacheEntry>> {
    let data = client.query(query).await?;
    let aggregate = Aggregate::from_value(data)?;
    debug!(
        "Fetched {} with {} section(s)",
        key,
        aggregate.len()
    );
    let entry = if replace {
        cache.replace(key.clone(), aggregate)
    } else {
        cache.populate(key.clone(), aggregate)
    };
    Ok(entry)
}
