//! Session manager (spec §4.H): a session bounds a conversational thread of
//! follow-up retrievals. Follow-ups on the same session never interleave
//! (single-flight), a session past its TTL is treated as gone, and the
//! manager enforces two hard caps from `SessionConfig`: a global
//! `max_sessions` and a per-session `max_packs_per_session`.
//!
//! Acceptance of a new session or pack happens while holding the map lock,
//! so the cap check and the insert are one atomic step: under concurrent
//! `start()` calls with `max_sessions = k`, exactly `k` succeed.

use crate::error::{PipelineError, Result};
use chrono::{DateTime, Utc};
use engine_core::config::SessionConfig;
use engine_core::errors::CoreError;
use engine_core::models::Session;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::warn;
use uuid::Uuid;

struct Entry {
    session: AsyncMutex<Session>,
}

/// Thread-safe session registry. `std::sync::Mutex` guards the map itself
/// (held only for the duration of a lookup/insert, never across an await);
/// each session's own `AsyncMutex` serializes follow-ups against it.
pub struct SessionManager {
    config: SessionConfig,
    sessions: std::sync::Mutex<HashMap<Uuid, Arc<Entry>>>,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Starts a new session, failing with `context_session_limit_exceeded`
    /// once `max_sessions` live (non-expired) sessions already exist.
    pub fn start(&self, now: DateTime<Utc>) -> Result<Uuid> {
        let mut map = self.sessions.lock().expect("session map poisoned");
        map.retain(|_, entry| {
            entry
                .session
                .try_lock()
                .map(|s| !s.is_expired(now, self.config.session_ttl_ms))
                .unwrap_or(true)
        });

        if map.len() >= self.config.max_sessions {
            warn!("session start rejected: {} live sessions at cap {}", map.len(), self.config.max_sessions);
            return Err(PipelineError::Core(CoreError::SessionLimitExceeded {
                max: self.config.max_sessions,
            }));
        }

        let session = Session::new(now);
        let id = session.session_id;
        map.insert(
            id,
            Arc::new(Entry {
                session: AsyncMutex::new(session),
            }),
        );
        Ok(id)
    }

    fn entry(&self, session_id: Uuid) -> Result<Arc<Entry>> {
        let map = self.sessions.lock().expect("session map poisoned");
        map.get(&session_id)
            .cloned()
            .ok_or_else(|| PipelineError::Core(CoreError::SessionMissing(session_id.to_string())))
    }

    /// Removes a session outright, e.g. once its TTL is confirmed expired by
    /// a caller that already holds no other reference to it.
    pub fn drop_session(&self, session_id: Uuid) {
        self.sessions.lock().expect("session map poisoned").remove(&session_id);
    }

    /// Runs one follow-up against `session_id`. Follow-ups on the same
    /// session queue behind each other (the per-session lock is held across
    /// `retrieve`); follow-ups on different sessions run fully concurrently.
    ///
    /// `retrieve` only runs after the TTL and question checks pass, and its
    /// packs are only appended to the session if it returns `Ok`: a failed
    /// follow-up never mutates session state.
    pub async fn follow_up<F, Fut>(&self, session_id: Uuid, question: &str, now: DateTime<Utc>, retrieve: F) -> Result<Vec<Uuid>>
    where
        F: FnOnce(Session) -> Fut,
        Fut: std::future::Future<Output = Result<Vec<Uuid>>>,
    {
        if question.trim().is_empty() {
            return Err(PipelineError::Core(CoreError::SessionQuestionInvalid));
        }

        let entry = self.entry(session_id)?;
        let mut session = entry.session.lock().await;

        if session.is_expired(now, self.config.session_ttl_ms) {
            warn!("session {session_id} expired, dropping");
            drop(session);
            self.drop_session(session_id);
            return Err(PipelineError::Core(CoreError::SessionMissing(session_id.to_string())));
        }

        let new_packs = retrieve(session.clone()).await?;

        if session.packs.len() + new_packs.len() > self.config.max_packs_per_session {
            return Err(PipelineError::Core(CoreError::SessionPackLimitExceeded {
                max: self.config.max_packs_per_session,
            }));
        }

        session.history.push(question.to_string());
        session.packs.extend(new_packs.iter().copied());
        session.last_activity_at = now;

        Ok(new_packs)
    }

    pub async fn snapshot(&self, session_id: Uuid) -> Result<Session> {
        let entry = self.entry(session_id)?;
        Ok(entry.session.lock().await.clone())
    }
}
