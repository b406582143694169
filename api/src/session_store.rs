use chatbot::QuizSession;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Sessions untouched for this long are dropped.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug)]
struct Entry {
    session: QuizSession,
    last_touched: Instant,
}

impl Entry {
    fn is_idle(&self, ttl: Duration, now: Instant) -> bool {
        now.duration_since(self.last_touched) > ttl
    }
}

/// In-memory quiz sessions keyed by id. Each session is only touched by its
/// own user's requests; the lock is never held across a generation call.
/// Idle sessions are treated as gone and evicted on the next `create` or
/// `evict_idle`.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let evicted = Self::retain_active(&mut sessions, self.ttl, now);
        if evicted > 0 {
            log::info!("Evicted {} idle session(s)", evicted);
        }
        sessions.insert(
            id,
            Entry {
                session: QuizSession::new(),
                last_touched: now,
            },
        );
        log::info!("Created session {}", id);
        id
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        let now = Instant::now();
        self.sessions
            .read()
            .await
            .get(&id)
            .is_some_and(|entry| !entry.is_idle(self.ttl, now))
    }

    pub async fn read<F, R>(&self, id: Uuid, f: F) -> Option<R>
    where
        F: FnOnce(&QuizSession) -> R,
    {
        self.touch(id, |session| f(session)).await
    }

    pub async fn update<F, R>(&self, id: Uuid, f: F) -> Option<R>
    where
        F: FnOnce(&mut QuizSession) -> R,
    {
        self.touch(id, f).await
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            log::info!("Removed session {}", id);
        }
        removed
    }

    /// Drops every idle session, returning how many went.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let evicted = Self::retain_active(&mut sessions, self.ttl, Instant::now());
        if evicted > 0 {
            log::info!("Evicted {} idle session(s)", evicted);
        }
        evicted
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn touch<F, R>(&self, id: Uuid, f: F) -> Option<R>
    where
        F: FnOnce(&mut QuizSession) -> R,
    {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        if sessions.get(&id)?.is_idle(self.ttl, now) {
            sessions.remove(&id);
            log::info!("Session {} expired", id);
            return None;
        }
        let entry = sessions.get_mut(&id)?;
        entry.last_touched = now;
        Some(f(&mut entry.session))
    }

    fn retain_active(sessions: &mut HashMap<Uuid, Entry>, ttl: Duration, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_idle(ttl, now));
        before - sessions.len()
    }
}
