use std::sync::Arc;

use crate::{
    db::RecordStore,
    services::{
        providers::{IdentityProvider, MetadataProvider, TextGenerator},
        JournalCache, SessionRegistry,
    },
};

/// Shared application state
///
/// Collaborators sit behind trait objects so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<dyn RecordStore>,
    pub metadata: Arc<dyn MetadataProvider>,
    pub generator: Arc<dyn TextGenerator>,
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: Arc<SessionRegistry>,
    pub journals: Arc<JournalCache>,
}

impl AppState {
    /// Creates state with empty session and journal caches
    pub fn new(
        records: Arc<dyn RecordStore>,
        metadata: Arc<dyn MetadataProvider>,
        generator: Arc<dyn TextGenerator>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            records,
            metadata,
            generator,
            identity,
            sessions: Arc::new(SessionRegistry::default()),
            journals: Arc::new(JournalCache::new()),
        }
    }
}
