// Image session store - TTL-bounded, in-memory cache of uploaded images
//
// Sessions group processed images awaiting consumption by one generation
// call. The store is an explicit object injected into callers (no ambient
// global state), single-process, with no persistence across restarts -
// sessions are inherently ephemeral.

mod expiry;

pub use expiry::DelayedTask;

use crate::models::ImageDescriptor;
use crate::utils::lock_mutex_recover;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

/// How long a session lives without being extended (30 minutes)
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// How often the backstop sweep runs (10 minutes)
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Public view of a stored session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSession {
    pub id: String,
    /// Principal that uploaded the images; used purely for ownership checks
    pub owner: String,
    pub images: Vec<ImageDescriptor>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Minimal session info for listing views
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub image_count: usize,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

struct SessionEntry {
    session: ImageSession,
    /// Monotonic deadline used for all expiry logic. The wall-clock
    /// `expires_at` on the session is for display only.
    deadline: Instant,
    expiry: DelayedTask,
}

struct Shared {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
    ttl: Duration,
}

/// Process-wide store mapping session ids to uploaded image sets.
///
/// Cheap to clone; clones share the same underlying map. Each session gets a
/// one-shot expiry task at creation, and [`ImageSessionStore::start_sweeper`]
/// adds a periodic backstop sweep for anything a missed timer leaves behind.
#[derive(Clone)]
pub struct ImageSessionStore {
    shared: Arc<Shared>,
}

impl ImageSessionStore {
    /// Create a store with the default 30-minute TTL
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }

    /// Create a store with a custom TTL (used by tests)
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                sessions: Mutex::new(HashMap::new()),
                sweeper: Mutex::new(None),
                ttl,
            }),
        }
    }

    /// Store images under a freshly generated session id owned by `owner`.
    ///
    /// Schedules an automatic cleanup at `now + TTL`.
    pub fn create_session(&self, owner: &str, images: Vec<ImageDescriptor>) -> String {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let deadline = Instant::now() + self.shared.ttl;

        let store = self.clone();
        let task_id = id.clone();
        let expiry = DelayedTask::spawn_at(deadline, async move {
            store.expire_session(&task_id).await;
        });

        let entry = SessionEntry {
            session: ImageSession {
                id: id.clone(),
                owner: owner.to_string(),
                images,
                created_at: now,
                expires_at: now + ttl_as_chrono(self.shared.ttl),
            },
            deadline,
            expiry,
        };

        let mut sessions = lock_mutex_recover(&self.shared.sessions);
        sessions.insert(id.clone(), entry);
        log::debug!("Created image session {} for {}", id, owner);
        id
    }

    /// Look up an unexpired session.
    ///
    /// When `owner` is supplied, a session belonging to someone else is
    /// reported as absent rather than forbidden, so callers cannot probe for
    /// the existence of foreign sessions.
    pub fn get_session(&self, session_id: &str, owner: Option<&str>) -> Option<ImageSession> {
        let sessions = lock_mutex_recover(&self.shared.sessions);
        let entry = sessions.get(session_id)?;

        if entry.deadline <= Instant::now() {
            return None;
        }
        if let Some(owner) = owner {
            if entry.session.owner != owner {
                return None;
            }
        }
        Some(entry.session.clone())
    }

    /// Reset a session's expiry to `now + TTL`.
    ///
    /// Returns false if the session is absent, already expired, or owned by
    /// someone else.
    pub fn extend_session(&self, session_id: &str, owner: &str) -> bool {
        let mut sessions = lock_mutex_recover(&self.shared.sessions);
        let Some(entry) = sessions.get_mut(session_id) else {
            return false;
        };
        if entry.deadline <= Instant::now() || entry.session.owner != owner {
            return false;
        }

        let deadline = Instant::now() + self.shared.ttl;
        entry.deadline = deadline;
        entry.session.expires_at = Utc::now() + ttl_as_chrono(self.shared.ttl);

        entry.expiry.cancel();
        let store = self.clone();
        let task_id = session_id.to_string();
        entry.expiry = DelayedTask::spawn_at(deadline, async move {
            store.expire_session(&task_id).await;
        });

        log::debug!("Extended image session {}", session_id);
        true
    }

    /// Delete a session's backing files and evict the entry.
    ///
    /// File deletion is best-effort: individual failures are logged and do
    /// not abort the remaining deletions. Calling this on an absent id is a
    /// no-op.
    pub async fn cleanup_session(&self, session_id: &str) {
        let files = {
            let mut sessions = lock_mutex_recover(&self.shared.sessions);
            match sessions.remove(session_id) {
                Some(entry) => {
                    entry.expiry.cancel();
                    session_file_paths(&entry.session)
                }
                None => return,
            }
        };

        delete_image_files(session_id, files).await;
        log::debug!("Cleaned up image session {}", session_id);
    }

    /// List unexpired sessions owned by `owner`
    pub fn list_sessions(&self, owner: &str) -> Vec<SessionSummary> {
        let sessions = lock_mutex_recover(&self.shared.sessions);
        let now = Instant::now();
        sessions
            .values()
            .filter(|entry| entry.deadline > now && entry.session.owner == owner)
            .map(|entry| SessionSummary {
                session_id: entry.session.id.clone(),
                image_count: entry.session.images.len(),
                created_at: entry.session.created_at,
                expires_at: entry.session.expires_at,
            })
            .collect()
    }

    /// Clean up every session whose deadline has passed, returning how many
    /// were removed. Intended as a periodic backstop for missed timers.
    pub async fn sweep_expired(&self) -> usize {
        let expired: Vec<String> = {
            let sessions = lock_mutex_recover(&self.shared.sessions);
            let now = Instant::now();
            sessions
                .values()
                .filter(|entry| entry.deadline <= now)
                .map(|entry| entry.session.id.clone())
                .collect()
        };

        let count = expired.len();
        for session_id in expired {
            self.cleanup_session(&session_id).await;
        }

        if count > 0 {
            log::info!("Sweep removed {} expired image sessions", count);
        }
        count
    }

    /// Start the periodic backstop sweep. Replaces any previous sweeper.
    pub fn start_sweeper(&self) {
        let store = self.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                store.sweep_expired().await;
            }
        });

        let mut sweeper = lock_mutex_recover(&self.shared.sweeper);
        if let Some(old) = sweeper.replace(handle) {
            old.abort();
        }
    }

    /// Stop all background work: the sweeper and every per-session timer.
    ///
    /// Backing files are left on disk; the maintenance sweep reclaims them.
    pub fn shutdown(&self) {
        if let Some(handle) = lock_mutex_recover(&self.shared.sweeper).take() {
            handle.abort();
        }
        let mut sessions = lock_mutex_recover(&self.shared.sessions);
        for entry in sessions.values() {
            entry.expiry.cancel();
        }
        sessions.clear();
    }

    /// Expiry-timer path: evict the entry and delete its files.
    ///
    /// The timer's own task handle is detached rather than cancelled, since
    /// aborting the currently running task would drop the file deletions.
    async fn expire_session(&self, session_id: &str) {
        let files = {
            let mut sessions = lock_mutex_recover(&self.shared.sessions);
            match sessions.remove(session_id) {
                Some(entry) => {
                    entry.expiry.detach();
                    session_file_paths(&entry.session)
                }
                None => return,
            }
        };

        delete_image_files(session_id, files).await;
        log::debug!("Image session {} expired", session_id);
    }

    #[cfg(test)]
    fn session_count(&self) -> usize {
        lock_mutex_recover(&self.shared.sessions).len()
    }
}

impl Default for ImageSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn ttl_as_chrono(ttl: Duration) -> ChronoDuration {
    ChronoDuration::from_std(ttl).unwrap_or_else(|_| ChronoDuration::minutes(30))
}

fn session_file_paths(session: &ImageSession) -> Vec<PathBuf> {
    session
        .images
        .iter()
        .map(|image| image.storage_path.clone())
        .collect()
}

async fn delete_image_files(session_id: &str, files: Vec<PathBuf>) {
    for path in files {
        if let Err(e) = tokio::fs::remove_file(&path).await {
            log::warn!(
                "Failed to delete image file {:?} for session {}: {}",
                path,
                session_id,
                e
            );
        }
    }
}
