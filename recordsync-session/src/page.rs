//! A page: one fetched aggregate, several editable sections.

use crate::config::SessionConfig;
use crate::error::SessionResult;
use crate::session::{EditSession, SectionSpec, fetch_aggregate};
use recordsync_cache::CacheStore;
use recordsync_model::{RecordSchema, SchemaValidator};
use recordsync_rpc::{Procedure, RemoteProcedureClient};
use recordsync_types::{QueryKey, SubKey};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// The sections of one aggregate, each with its own session.
///
/// Sessions share the page's cache and client, so saving one section
/// patches only its own sub-key and leaves sibling sections untouched.
pub struct Page {
    query_key: QueryKey,
    query: Procedure,
    client: Arc<dyn RemoteProcedureClient>,
    cache: CacheStore,
    sessions: BTreeMap<SubKey, Arc<EditSession>>,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("query_key", &self.query_key)
            .field("query", &self.query)
            .field("sections", &self.sessions.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Page {
    pub fn builder(
        query_key: QueryKey,
        query: Procedure,
        client: Arc<dyn RemoteProcedureClient>,
        cache: CacheStore,
    ) -> PageBuilder {
        PageBuilder {
            query_key,
            query,
            client,
            cache,
            config: SessionConfig::default(),
            sections: Vec::new(),
        }
    }

    pub fn query_key(&self) -> &QueryKey {
        &self.query_key
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// The session editing `sub_key`.
    pub fn section(&self, sub_key: &SubKey) -> Option<Arc<EditSession>> {
        self.sessions.get(sub_key).cloned()
    }

    /// All sessions, ordered by sub-key.
    pub fn sections(&self) -> impl Iterator<Item = (&SubKey, &Arc<EditSession>)> {
        self.sessions.iter()
    }

    /// Fetches the aggregate once if it is not cached, then syncs every
    /// section that is `Viewing`.
    pub async fn load(&self) -> SessionResult<()> {
        if !self.cache.contains(&self.query_key) {
            fetch_aggregate(
                self.client.as_ref(),
                &self.cache,
                &self.query_key,
                &self.query,
                false,
            )
            .await?;
        }
        self.sync_sections()
    }

    /// Refetches the aggregate, then syncs every section that is `Viewing`.
    pub async fn refresh(&self) -> SessionResult<()> {
        fetch_aggregate(
            self.client.as_ref(),
            &self.cache,
            &self.query_key,
            &self.query,
            true,
        )
        .await?;
        self.sync_sections()
    }

    fn sync_sections(&self) -> SessionResult<()> {
        for (sub_key, session) in &self.sessions {
            if !session.sync_from_cache()? {
                debug!("Section {} not synced", sub_key);
            }
        }
        Ok(())
    }
}

/// Builds a [`Page`] section by section.
pub struct PageBuilder {
    query_key: QueryKey,
    query: Procedure,
    client: Arc<dyn RemoteProcedureClient>,
    cache: CacheStore,
    config: SessionConfig,
    sections: Vec<(SubKey, Procedure, RecordSchema)>,
}

impl PageBuilder {
    /// Configuration applied to every section's session.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds an editable section. A later section with the same sub-key
    /// replaces an earlier one.
    pub fn section(mut self, sub_key: SubKey, mutation: Procedure, schema: RecordSchema) -> Self {
        self.sections.push((sub_key, mutation, schema));
        self
    }

    pub fn build(self) -> Page {
        let mut sessions = BTreeMap::new();
        for (sub_key, mutation, schema) in self.sections {
            let spec = SectionSpec {
                query_key: self.query_key.clone(),
                query: self.query.clone(),
                sub_key: sub_key.clone(),
                mutation,
                validator: SchemaValidator::new(schema),
            };
            let session = EditSession::new(
                spec,
                self.client.clone(),
                self.cache.clone(),
                self.config.clone(),
            );
            sessions.insert(sub_key, Arc::new(session));
        }
        Page {
            query_key: self.query_key,
            query: self.query,
            client: self.client,
            cache: self.cache,
            sessions,
        }
    }
}
