use crate::session::Session;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

/// Id of the session used when a request names none.
pub const DEFAULT_SESSION_ID: Uuid = Uuid::nil();

/// A session shared between request handlers. Holding the lock for a whole
/// turn serializes turns within one session.
pub type SharedSession = Arc<Mutex<Session>>;

/// Bounds on how many sessions are kept and for how long.
///
/// The default session is never evicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Most sessions held at once. Creating one more first drops the least
    /// recently used.
    pub max_sessions: usize,
    /// Sessions not touched for this long are dropped.
    pub idle_ttl: Duration,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_sessions: 10_000,
            idle_ttl: Duration::from_secs(3600),
        }
    }
}

struct Entry {
    session: SharedSession,
    last_seen: Instant,
}

/// In-memory sessions keyed by id.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    system_prompt: String,
    limits: SessionLimits,
}

impl SessionRegistry {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self::with_limits(system_prompt, SessionLimits::default())
    }

    pub fn with_limits(system_prompt: impl Into<String>, limits: SessionLimits) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            system_prompt: system_prompt.into(),
            limits,
        }
    }

    pub fn limits(&self) -> SessionLimits {
        self.limits
    }

    /// Returns the session for `id`, creating a fresh one if needed.
    ///
    /// Creating a session evicts idle ones and, at capacity, the least
    /// recently used one.
    pub async fn get_or_create(&self, id: Uuid) -> SharedSession {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get_mut(&id) {
            entry.last_seen = now;
            return entry.session.clone();
        }

        self.evict(&mut sessions, now);
        debug!(session_id = %id, "Creating session");
        let session = Arc::new(Mutex::new(Session::with_id(id, self.system_prompt.clone())));
        sessions.insert(
            id,
            Entry {
                session: session.clone(),
                last_seen: now,
            },
        );
        session
    }

    pub async fn default_session(&self) -> SharedSession {
        self.get_or_create(DEFAULT_SESSION_ID).await
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).map(|e| e.session.clone())
    }

    pub async fn remove(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.write().await.remove(&id).map(|e| e.session)
    }

    /// Drops sessions idle for longer than the TTL. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        self.retain_active(&mut sessions, Instant::now());
        before - sessions.len()
    }

    /// Start a background loop calling [`evict_idle`](Self::evict_idle).
    pub fn start_sweeper(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            loop {
                timer.tick().await;
                let evicted = self.evict_idle().await;
                if evicted > 0 {
                    debug!(evicted, "Swept idle sessions");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn retain_active(&self, sessions: &mut HashMap<Uuid, Entry>, now: Instant) {
        let ttl = self.limits.idle_ttl;
        sessions.retain(|id, e| *id == DEFAULT_SESSION_ID || now.duration_since(e.last_seen) < ttl);
    }

    /// Makes room for one more session.
    fn evict(&self, sessions: &mut HashMap<Uuid, Entry>, now: Instant) {
        let before = sessions.len();
        self.retain_active(sessions, now);

        while sessions.len() >= self.limits.max_sessions {
            let oldest = sessions
                .iter()
                .filter(|(id, _)| **id != DEFAULT_SESSION_ID)
                .min_by_key(|(_, e)| e.last_seen)
                .map(|(id, _)| *id);
            let Some(oldest) = oldest else {
                break;
            };
            sessions.remove(&oldest);
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, held = sessions.len(), "Evicted sessions");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::state::DialogueState;

    fn limited(max_sessions: usize, idle_ttl: Duration) -> SessionRegistry {
        SessionRegistry::with_limits(
            "persona",
            SessionLimits {
                max_sessions,
                idle_ttl,
            },
        )
    }

    #[tokio::test]
    async fn get_or_create_returns_same_session() {
        let registry = SessionRegistry::new("persona");
        let a = registry.default_session().await;
        a.lock().await.state = DialogueState::Finalizing;

        let b = registry.get_or_create(DEFAULT_SESSION_ID).await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.lock().await.state, DialogueState::Finalizing);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn new_sessions_start_at_greeting_with_prompt() {
        let registry = SessionRegistry::new("persona");
        let id = Uuid::new_v4();
        let session = registry.get_or_create(id).await;
        let session = session.lock().await;
        assert_eq!(session.id, id);
        assert_eq!(session.state, DialogueState::Greeting);
        assert_eq!(session.system_prompt(), "persona");
        assert_eq!(session.message_count(), 1);
    }

    #[tokio::test]
    async fn get_and_remove() {
        let registry = SessionRegistry::new("persona");
        assert!(registry.is_empty().await);
        let id = Uuid::new_v4();
        assert!(registry.get(id).await.is_none());

        registry.get_or_create(id).await;
        assert!(registry.get(id).await.is_some());
        assert!(registry.remove(id).await.is_some());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn random_ids_never_exceed_the_cap() {
        let registry = limited(100, Duration::from_secs(3600));
        for _ in 0..10_000 {
            registry.get_or_create(Uuid::new_v4()).await;
        }
        assert_eq!(registry.len().await, 100);
    }

    #[tokio::test]
    async fn least_recently_used_session_is_evicted_first() {
        let registry = limited(2, Duration::from_secs(3600));
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        registry.get_or_create(a).await;
        registry.get_or_create(b).await;
        // Touch `a` so `b` becomes the oldest.
        registry.get_or_create(a).await;
        registry.get_or_create(c).await;

        assert!(registry.get(a).await.is_some());
        assert!(registry.get(b).await.is_none());
        assert!(registry.get(c).await.is_some());
    }

    #[tokio::test]
    async fn idle_sessions_are_dropped_but_default_stays() {
        let registry = limited(100, Duration::ZERO);
        registry.default_session().await;
        let first = Uuid::new_v4();
        registry.get_or_create(first).await;
        // Creating another session already drops the idle one.
        registry.get_or_create(Uuid::new_v4()).await;
        assert!(registry.get(first).await.is_none());

        assert_eq!(registry.evict_idle().await, 1);
        assert_eq!(registry.len().await, 1);
        assert!(registry.get(DEFAULT_SESSION_ID).await.is_some());
    }

    #[tokio::test]
    async fn default_session_survives_the_cap() {
        let registry = limited(1, Duration::from_secs(3600));
        registry.default_session().await;
        let other = Uuid::new_v4();
        registry.get_or_create(other).await;
        registry.get_or_create(Uuid::new_v4()).await;

        assert!(registry.get(DEFAULT_SESSION_ID).await.is_some());
        assert!(registry.get(other).await.is_none());
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn sweeper_reclaims_idle_sessions() {
        let registry = Arc::new(limited(100, Duration::ZERO));
        registry.get_or_create(Uuid::new_v4()).await;

        let handle = registry.clone().start_sweeper(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert!(registry.is_empty().await);
    }
}
