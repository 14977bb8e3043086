use std::time::Duration;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::app::AppState;

pub const SESSION_COOKIE: &str = "matchday_session";

const SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Player,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "player" => Some(Role::Player),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Player => "player",
        }
    }
}

/// Minimal identity claims carried by a session. The password hash is never
/// stored here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i64,
    pub name: String,
    pub role: Role,
}

pub trait SessionService {
    /// Creates a session for the given user and returns the opaque token to
    /// hand to the client.
    fn create(&self, user: SessionUser) -> String;
    fn get(&self, token: &str) -> Option<SessionUser>;
    /// Idempotent: destroying an absent session is not an error.
    fn destroy(&self, token: &str);
}

pub struct SessionServiceImpl {
    sessions: moka::sync::Cache<String, SessionUser>,
}

impl SessionServiceImpl {
    pub fn new() -> Self {
        Self {
            sessions: moka::sync::Cache::builder()
                .time_to_idle(SESSION_TTL)
                .build(),
        }
    }
}

impl SessionService for SessionServiceImpl {
    fn create(&self, user: SessionUser) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(token.clone(), user);
        token
    }

    fn get(&self, token: &str) -> Option<SessionUser> {
        self.sessions.get(token)
    }

    fn destroy(&self, token: &str) {
        self.sessions.invalidate(token);
    }
}

/// Rejection of the access guard. Unauthenticated or wrong-role callers are
/// sent to the login page rather than an error status.
pub struct AuthRedirect;

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, "/login")]).into_response()
    }
}

/// Session of an authenticated admin. Extraction fails with a redirect to
/// `/login` when there is no session or the role does not match, before the
/// handler body runs.
pub struct AdminSession(pub SessionUser);

/// Session of an authenticated player; same rejection rules as [`AdminSession`].
pub struct PlayerSession(pub SessionUser);

fn session_from_parts(parts: &Parts, state: &AppState) -> Option<SessionUser> {
    let jar = CookieJar::from_headers(&parts.headers);
    let cookie = jar.get(SESSION_COOKIE)?;
    state.session_service.get(cookie.value())
}

fn require_role(session: Option<SessionUser>, required: Role) -> Result<SessionUser, AuthRedirect> {
    match session {
        Some(user) if user.role == required => Ok(user),
        _ => Err(AuthRedirect),
    }
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AuthRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(session_from_parts(parts, state), Role::Admin).map(AdminSession)
    }
}

impl FromRequestParts<AppState> for PlayerSession {
    type Rejection = AuthRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(session_from_parts(parts, state), Role::Player).map(PlayerSession)
    }
}
