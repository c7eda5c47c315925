//! Per-user dialog sessions
//!
//! A [`Session`] accumulates the fields of one guided expense entry across
//! several events. Sessions live behind a [`SessionStore`] keyed by user id;
//! the store is injected so the surrounding application decides where session
//! state lives. [`MemorySessionStore`] is enough for a single process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::OwnedMutexGuard;

use crate::error::Result;
use crate::models::{Draft, UserId};

/// Dialog step; each non-idle step owns one field of the draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Idle,
    ChoosingCategory,
    ChoosingDate,
    EnteringAmount,
    EnteringDescription,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ChoosingCategory => "choosing_category",
            Self::ChoosingDate => "choosing_date",
            Self::EnteringAmount => "entering_amount",
            Self::EnteringDescription => "entering_description",
        }
    }
}

impl std::str::FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(Self::Idle),
            "choosing_category" => Ok(Self::ChoosingCategory),
            "choosing_date" => Ok(Self::ChoosingDate),
            "entering_amount" => Ok(Self::EnteringAmount),
            "entering_description" => Ok(Self::EnteringDescription),
            _ => Err(format!("Unknown dialog step: {}", s)),
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fields collected so far for one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub step: Step,
    pub collected: Draft,
    /// Description carried over from free text, committed at finalization
    pub pending_description: Option<String>,
    /// Set once the description question is settled (answered, skipped, or
    /// decided by free text) so the dialog does not ask for it
    pub description_resolved: bool,
}

impl Session {
    /// True while a guided entry is in progress
    pub fn is_active(&self) -> bool {
        self.step != Step::Idle
    }
}

/// Key-value storage of sessions by user id
///
/// `load` returns an idle, empty session for users without one.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, user_id: UserId) -> Result<Session>;

    async fn save(&self, user_id: UserId, session: &Session) -> Result<()>;

    /// Drop the user's session, returning them to idle
    async fn clear(&self, user_id: UserId) -> Result<()>;
}

/// Process-local session store
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<Mutex<HashMap<UserId, Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, Session>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of users with a stored session
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, user_id: UserId) -> Result<Session> {
        Ok(self.lock().get(&user_id).cloned().unwrap_or_default())
    }

    async fn save(&self, user_id: UserId, session: &Session) -> Result<()> {
        self.lock().insert(user_id, session.clone());
        Ok(())
    }

    async fn clear(&self, user_id: UserId) -> Result<()> {
        self.lock().remove(&user_id);
        Ok(())
    }
}

/// One async lock per user
///
/// Holding a user's guard serializes every event for that user while leaving
/// other users free to proceed in parallel. A user's entry is dropped once
/// nobody holds or waits on it.
#[derive(Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, Arc<tokio::sync::Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub async fn acquire(&self, user_id: UserId) -> UserGuard<'_> {
        let lock = self.map().entry(user_id).or_default().clone();
        UserGuard {
            locks: self,
            user_id,
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Number of users with a live lock entry
    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }
}

/// Exclusive access to one user's dialog, released on drop
pub struct UserGuard<'a> {
    locks: &'a UserLocks,
    user_id: UserId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();

        let mut map = self.locks.map();
        // Only the map itself still references the lock
        if map
            .get(&self.user_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(&self.user_id);
        }
    }
}
