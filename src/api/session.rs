//! In-memory credential sessions for the web form.
//!
//! Keys live only in process memory, are forgotten after a period without
//! use, and disappear on restart. Session ids are always minted here, never
//! taken from the client.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap, HeaderValue};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::ApiKey;

pub const SESSION_COOKIE: &str = "cookin_session";

struct SessionEntry {
    key: ApiKey,
    last_used: Instant,
}

impl SessionEntry {
    fn is_expired(&self, now: Instant, idle_timeout: Duration) -> bool {
        now.duration_since(self.last_used) >= idle_timeout
    }
}

/// Session id to credential map with idle expiry.
#[derive(Clone)]
pub struct SessionStore {
    entries: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// The key for a live session. Using a session refreshes its idle timer.
    pub async fn get(&self, id: Uuid) -> Option<ApiKey> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(&id)?;
        if entry.is_expired(now, self.idle_timeout) {
            entries.remove(&id);
            tracing::debug!(session = %id, "Session expired");
            return None;
        }
        entry.last_used = now;
        Some(entry.key.clone())
    }

    /// Store a key under a freshly minted session id.
    ///
    /// Expired sessions are swept first, so the map only holds sessions used
    /// within the idle window.
    pub async fn create(&self, key: ApiKey) -> Uuid {
        let now = Instant::now();
        let id = Uuid::new_v4();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.is_expired(now, self.idle_timeout));
        entries.insert(id, SessionEntry { key, last_used: now });
        id
    }

    /// Forget the key; returns whether one was stored.
    pub async fn clear(&self, id: Uuid) -> bool {
        self.entries.write().await.remove(&id).is_some()
    }

    /// Number of stored sessions, including any not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Session id carried by the request cookie, if well-formed.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value binding the browser to a session.
pub fn session_cookie(id: Uuid, secure: bool) -> HeaderValue {
    let secure = if secure { "; Secure" } else { "" };
    // A hyphenated UUID is always a valid header value.
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict{}",
        SESSION_COOKIE, id, secure
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("cookin_session=; Path=/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn reads_session_among_other_cookies() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; cookin_session={}; lang=fr", id)).unwrap(),
        );
        assert_eq!(session_id(&headers), Some(id));
    }

    #[test]
    fn ignores_malformed_session() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("cookin_session=not-a-uuid"));
        assert_eq!(session_id(&headers), None);
        assert_eq!(session_id(&HeaderMap::new()), None);
    }

    #[test]
    fn cookie_round_trips_through_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        let cookie = session_cookie(id, true);
        let pair = cookie.to_str().unwrap().split(';').next().unwrap().to_string();
        headers.insert(header::COOKIE, HeaderValue::from_str(&pair).unwrap());
        assert_eq!(session_id(&headers), Some(id));
    }

    #[test]
    fn secure_attribute_follows_setting() {
        let id = Uuid::new_v4();
        let secure = session_cookie(id, true);
        let plain = session_cookie(id, false);
        assert!(secure.to_str().unwrap().ends_with("; Secure"));
        assert!(!plain.to_str().unwrap().contains("Secure"));
        assert!(plain.to_str().unwrap().contains("HttpOnly"));
    }

    #[tokio::test]
    async fn create_get_clear() {
        let store = SessionStore::new(HOUR);
        assert!(store.get(Uuid::new_v4()).await.is_none());

        let id = store.create(ApiKey::new("sk-a").unwrap()).await;
        assert_eq!(store.get(id).await.unwrap().expose(), "sk-a");
        assert_eq!(store.len().await, 1);

        assert!(store.clear(id).await);
        assert!(!store.clear(id).await);
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn every_create_mints_a_new_id() {
        let store = SessionStore::new(HOUR);
        let a = store.create(ApiKey::new("sk-a").unwrap()).await;
        let b = store.create(ApiKey::new("sk-a").unwrap()).await;
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let store = SessionStore::new(Duration::from_millis(50));
        let id = store.create(ApiKey::new("sk-a").unwrap()).await;
        assert!(store.get(id).await.is_some());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(store.get(id).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn expired_sessions_are_swept_on_create() {
        let store = SessionStore::new(Duration::from_millis(50));
        for _ in 0..10 {
            store.create(ApiKey::new("sk-a").unwrap()).await;
        }
        assert_eq!(store.len().await, 10);

        tokio::time::sleep(Duration::from_millis(120)).await;
        let live = store.create(ApiKey::new("sk-b").unwrap()).await;
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(live).await.unwrap().expose(), "sk-b");
    }
}
