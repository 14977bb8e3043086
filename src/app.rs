use std::sync::Arc;

use axum::response::IntoResponse;
use thiserror::Error;

use crate::{
    auth::{AuthService, AuthServiceImpl},
    enrollment::{EnrollmentService, EnrollmentServiceImpl},
    game::{GameService, GameServiceImpl},
    persistence::{
        games::{GameRepository, SqliteGameRepository},
        users::{SqliteUserRepository, UserRepository},
    },
    session::{SessionService, SessionServiceImpl},
};

pub type ArcAuthService = Arc<Box<dyn AuthService + Send + Sync + 'static>>;
pub type ArcGameService = Arc<Box<dyn GameService + Send + Sync + 'static>>;
pub type ArcEnrollmentService = Arc<Box<dyn EnrollmentService + Send + Sync + 'static>>;
pub type ArcSessionService = Arc<Box<dyn SessionService + Send + Sync + 'static>>;

pub type ArcUserRepository = Arc<Box<dyn UserRepository + Send + Sync + 'static>>;
pub type ArcGameRepository = Arc<Box<dyn GameRepository + Send + Sync + 'static>>;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: ArcAuthService,
    pub game_service: ArcGameService,
    pub enrollment_service: ArcEnrollmentService,
    pub session_service: ArcSessionService,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::Validation(msg.into()))
    }

    pub fn auth_rejected<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::AuthRejected(msg.into()))
    }

    pub fn forbidden<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::Forbidden(msg.into()))
    }

    pub fn not_found<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::NotFound(msg.into()))
    }

    pub fn capacity_exceeded<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::CapacityExceeded(msg.into()))
    }

    pub fn conflict<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::Conflict(msg.into()))
    }

    pub fn internal<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::Internal(msg.into()))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let (status, msg) = match self {
            ServiceError::Validation(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            ServiceError::AuthRejected(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            ServiceError::Forbidden(msg) => (axum::http::StatusCode::FORBIDDEN, msg),
            ServiceError::NotFound(msg) => (axum::http::StatusCode::NOT_FOUND, msg),
            ServiceError::CapacityExceeded(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            ServiceError::Conflict(msg) => (axum::http::StatusCode::CONFLICT, msg),
            ServiceError::Database(e) => {
                log::error!("database error: {}", e);
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Server Error".to_string(),
                )
            }
            ServiceError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Server Error".to_string(),
                )
            }
        };
        (status, msg).into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub fn construct_app(pool: sqlx::Pool<sqlx::Sqlite>) -> AppState {
    let user_repository: ArcUserRepository =
        Arc::new(Box::new(SqliteUserRepository::new(pool.clone())));
    let game_repository: ArcGameRepository = Arc::new(Box::new(SqliteGameRepository::new(pool)));

    let session_service: ArcSessionService = Arc::new(Box::new(SessionServiceImpl::new()));
    let auth_service: ArcAuthService =
        Arc::new(Box::new(AuthServiceImpl::new(user_repository.clone())));
    let game_service: ArcGameService =
        Arc::new(Box::new(GameServiceImpl::new(game_repository.clone())));
    let enrollment_service: ArcEnrollmentService =
        Arc::new(Box::new(EnrollmentServiceImpl::new(game_repository)));

    AppState {
        auth_service,
        game_service,
        enrollment_service,
        session_service,
    }
}
