//! In-memory session state. Nothing is persisted; a session lives until it is
//! deleted, sits idle past the configured timeout, or the process exits.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;
use uuid::Uuid;

use crate::analysis::Analysis;
use crate::models::candidate::{Candidate, JobDescription, SkippedUpload};
use crate::models::conversation::Conversation;

#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub job: Option<JobDescription>,
    /// Ranked, highest match first.
    pub candidates: Vec<Candidate>,
    pub skipped: Vec<SkippedUpload>,
    pub conversation: Conversation,
    /// Shown inline on the session page until the next successful action.
    pub last_error: Option<String>,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            job: None,
            candidates: Vec::new(),
            skipped: Vec::new(),
            conversation: Conversation::default(),
            last_error: None,
        }
    }

    pub fn is_analyzed(&self) -> bool {
        self.job.is_some()
    }

    /// Replaces all results with a fresh analysis and starts a new conversation.
    pub fn apply_analysis(&mut self, analysis: Analysis) {
        self.job = Some(analysis.job);
        self.candidates = analysis.candidates;
        self.skipped = analysis.skipped;
        self.conversation.clear();
        self.last_error = None;
    }

    pub fn candidate(&self, id: Uuid) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }
}

struct Entry {
    session: Arc<Mutex<Session>>,
    last_access: Instant,
}

/// Sessions keyed by id. Each session has its own lock, so a slow model call
/// only blocks requests for that session. Idle sessions are dropped by
/// `evict_idle`, which `spawn_sweeper` runs on an interval.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Entry>>>,
}

impl SessionStore {
    pub async fn create(&self) -> (Uuid, Arc<Mutex<Session>>) {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(Session::new(id)));
        self.inner.write().await.insert(
            id,
            Entry {
                session: session.clone(),
                last_access: Instant::now(),
            },
        );
        info!("Session {id} created");
        (id, session)
    }

    /// Looks up a session and marks it as recently used.
    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<Session>>> {
        let mut sessions = self.inner.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_access = Instant::now();
        Some(entry.session.clone())
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.inner.write().await.remove(&id).is_some();
        if removed {
            info!("Session {id} removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Drops sessions not accessed within `max_idle`. Returns how many were removed.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_access) <= max_idle);
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {evicted} idle sessions ({} remaining)", sessions.len());
        }
        evicted
    }

    /// Runs `evict_idle` every `every` until the runtime shuts down.
    pub fn spawn_sweeper(&self, every: Duration, max_idle: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                store.evict_idle(max_idle).await;
            }
        })
    }
}
