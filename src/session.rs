//! Per-visitor widget sessions, identified by a cookie.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;
use uuid::Uuid;

use crate::widget::WidgetSlot;

pub const SESSION_COOKIE: &str = "fclite-session";
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

struct Session {
    slot: Arc<WidgetSlot>,
    last_seen: Instant,
}

pub struct Sessions {
    sessions: Mutex<HashMap<Uuid, Session>>,
    idle_timeout: Duration,
}

impl Sessions {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Default::default(),
            idle_timeout,
        }
    }

    /// Finds the slot of the visitor behind `jar`, starting a new session if the cookie is
    /// missing, malformed or expired. The returned jar carries the session cookie.
    pub fn resolve(&self, jar: CookieJar) -> (CookieJar, Arc<WidgetSlot>) {
        let id = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

        let before = sessions.len();
        sessions.retain(|_, session| now.duration_since(session.last_seen) < self.idle_timeout);

        if sessions.len() != before {
            debug!(expired = before - sessions.len(), "Dropped idle widget sessions");
        }

        if let Some(session) = id.and_then(|id| sessions.get_mut(&id)) {
            session.last_seen = now;

            return (jar, session.slot.clone());
        }

        let id = Uuid::new_v4();
        let slot = Arc::new(WidgetSlot::new());
        sessions.insert(
            id,
            Session {
                slot: slot.clone(),
                last_seen: now,
            },
        );
        debug!(%id, "Started a widget session");

        (jar.add(session_cookie(id)), slot)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

fn session_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
