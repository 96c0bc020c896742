//! # Sessions
//!
//! Server-side sessions keyed by an opaque cookie.
//!
//! ## Cookie
//! - `session`: 32 random bytes, URL-safe base64, `HttpOnly; SameSite=Lax; Path=/`
//! - `Secure` when `COOKIE_SECURE` is set
//! - Signed in: lives as long as `SESSION_TTL_SECS`, the store forgets it at the same time
//! - Anonymous, only opened to carry a flash: ten minutes at most
//!
//! ## Contents
//! - the signed-in user: id, email, backend access token and role
//! - one flash message, shown once on the next rendered page
//!
//! ## Gating
//! - [`Associate`]: any signed-in user, otherwise redirect to `/login`
//! - [`Admin`]: signed-in admin, `/login` when signed out, `/dashboard` otherwise
//!
//! Signing in always hands out a fresh id, the old one is dropped. Expired sessions stay in
//! the store, unusable, until [`SessionStore::purge_expired`] hands their users back so the
//! backend tokens can be revoked.
use std::{
    convert::Infallible,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    response::{IntoResponse, Redirect, Response},
};
use bank::models::{AuthSession, Role};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use dashmap::DashMap;
use rand::{RngCore, rngs::OsRng};
use tracing::debug;

use crate::state::AppState;

pub const COOKIE_NAME: &str = "session";
pub const ANONYMOUS_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Info,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub access_token: String,
    pub role: Role,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<AuthSession> for SessionUser {
    fn from(session: AuthSession) -> Self {
        Self {
            id: session.user.id,
            email: session.user.email,
            access_token: session.access_token,
            role: session.user.role,
        }
    }
}

struct Session {
    user: Option<SessionUser>,
    flash: Option<Flash>,
    expires_at: Instant,
}

pub struct SessionStore {
    sessions: DashMap<String, Session>,
    ttl: Duration,
    anonymous_ttl: Duration,
    secure: bool,
}

fn new_id() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

impl SessionStore {
    pub fn new(ttl: Duration, secure: bool) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            anonymous_ttl: ttl.min(ANONYMOUS_TTL),
            secure,
        }
    }

    pub fn with_anonymous_ttl(mut self, ttl: Duration) -> Self {
        self.anonymous_ttl = ttl;
        self
    }

    fn open(&self, user: Option<SessionUser>) -> String {
        let id = new_id();
        let ttl = if user.is_some() { self.ttl } else { self.anonymous_ttl };

        self.sessions.insert(
            id.clone(),
            Session {
                user,
                flash: None,
                expires_at: Instant::now() + ttl,
            },
        );

        id
    }

    fn live(&self, id: &str) -> bool {
        self.sessions
            .get(id)
            .is_some_and(|session| session.expires_at > Instant::now())
    }

    pub fn user(&self, id: &str) -> Option<SessionUser> {
        if !self.live(id) {
            return None;
        }

        self.sessions.get(id)?.user.clone()
    }

    pub fn set_flash(&self, id: &str, flash: Flash) -> bool {
        if !self.live(id) {
            return false;
        }

        match self.sessions.get_mut(id) {
            Some(mut session) => {
                session.flash = Some(flash);
                true
            }
            None => false,
        }
    }

    pub fn take_flash(&self, id: &str) -> Option<Flash> {
        if !self.live(id) {
            return None;
        }

        self.sessions.get_mut(id)?.flash.take()
    }

    /// Drops `previous` and opens a fresh session for `user`.
    pub fn sign_in(&self, previous: Option<&str>, user: SessionUser) -> String {
        if let Some(previous) = previous {
            self.sessions.remove(previous);
        }

        debug!("Session opened for {}", user.email);
        self.open(Some(user))
    }

    pub fn end(&self, id: &str) -> Option<SessionUser> {
        self.sessions.remove(id).and_then(|(_, session)| session.user)
    }

    /// Forgets expired sessions, returning the users that were still signed in on them.
    pub fn purge_expired(&self) -> Vec<SessionUser> {
        let now = Instant::now();
        let mut signed_in = Vec::new();

        self.sessions.retain(|_, session| {
            if session.expires_at > now {
                return true;
            }

            signed_in.extend(session.user.take());
            false
        });

        signed_in
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn cookie(&self, id: &str) -> String {
        self.cookie_for(id, self.ttl)
    }

    pub fn anonymous_cookie(&self, id: &str) -> String {
        self.cookie_for(id, self.anonymous_ttl)
    }

    fn cookie_for(&self, id: &str, ttl: Duration) -> String {
        let secure = if self.secure { "; Secure" } else { "" };

        format!(
            "{COOKIE_NAME}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{secure}",
            ttl.as_secs()
        )
    }

    pub fn clear_cookie(&self) -> String {
        format!("{COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}

/// Value of the session cookie in a request, if any.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == COOKIE_NAME && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Whoever is asking, signed in or not.
pub struct Visitor {
    pub session_id: Option<String>,
    pub user: Option<SessionUser>,
}

impl Visitor {
    pub fn take_flash(&self, store: &SessionStore) -> Option<Flash> {
        store.take_flash(self.session_id.as_deref()?)
    }
}

impl FromRequestParts<Arc<AppState>> for Visitor {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let session_id = session_id(&parts.headers);
        let user = session_id.as_deref().and_then(|id| state.sessions.user(id));

        Ok(Self { session_id, user })
    }
}

pub struct Associate(pub SessionUser);

impl FromRequestParts<Arc<AppState>> for Associate {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Ok(visitor) = Visitor::from_request_parts(parts, state).await;

        visitor
            .user
            .map(Associate)
            .ok_or_else(|| Redirect::to("/login"))
    }
}

pub struct Admin(pub SessionUser);

impl FromRequestParts<Arc<AppState>> for Admin {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Associate(user) = Associate::from_request_parts(parts, state).await?;

        if user.is_admin() {
            Ok(Admin(user))
        } else {
            Err(Redirect::to("/dashboard"))
        }
    }
}

fn with_cookie(cookie: &str, response: impl IntoResponse) -> Response {
    match HeaderValue::from_str(cookie) {
        Ok(value) => ([(SET_COOKIE, value)], response).into_response(),
        Err(_) => response.into_response(),
    }
}

/// Redirects to `to`, leaving `flash` for the next page. Opens a session if needed.
pub fn redirect_with(store: &SessionStore, visitor: &Visitor, to: &str, flash: Flash) -> Response {
    if let Some(id) = visitor.session_id.as_deref() {
        if store.set_flash(id, flash.clone()) {
            return Redirect::to(to).into_response();
        }
    }

    let id = store.open(None);
    store.set_flash(&id, flash);

    with_cookie(&store.anonymous_cookie(&id), Redirect::to(to))
}

/// Signs `user` in on a fresh session and redirects with a flash.
pub fn sign_in_redirect(
    store: &SessionStore,
    visitor: &Visitor,
    user: SessionUser,
    to: &str,
    flash: Flash,
) -> Response {
    let id = store.sign_in(visitor.session_id.as_deref(), user);
    store.set_flash(&id, flash);

    with_cookie(&store.cookie(&id), Redirect::to(to))
}

pub fn sign_out_redirect(store: &SessionStore, to: &str) -> Response {
    with_cookie(&store.clear_cookie(), Redirect::to(to))
}
