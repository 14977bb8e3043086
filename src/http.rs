use axum::{
    Form, Router,
    extract::{Path, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;

use crate::{
    app::{AppState, ServiceResult},
    game::{GameDraft, GameId},
    session::{AdminSession, PlayerSession, Role, SESSION_COOKIE},
    views,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_landing))
        .route("/signup", get(handle_signup_form).post(handle_signup))
        .route("/login", get(handle_login_form).post(handle_login))
        .route("/logout", get(handle_logout))
        .route("/player/dashboard", get(handle_player_dashboard))
        .route("/games/{id}/enroll", post(handle_enroll))
        .route("/admin/dashboard", get(handle_admin_dashboard))
        .route(
            "/games/create",
            get(handle_create_game_form).post(handle_create_game),
        )
        .route(
            "/games/{id}/edit",
            get(handle_edit_game_form).post(handle_edit_game),
        )
        .route("/games/{id}/delete", post(handle_delete_game))
        .with_state(state)
}

async fn handle_landing() -> Html<String> {
    views::landing()
}

async fn handle_signup_form() -> Html<String> {
    views::signup_form()
}

#[derive(Deserialize)]
pub struct SignupPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

async fn handle_signup(
    State(state): State<AppState>,
    Form(payload): Form<SignupPayload>,
) -> ServiceResult<Redirect> {
    state
        .auth_service
        .signup(&payload.name, &payload.email, &payload.password, &payload.role)
        .await?;
    Ok(Redirect::to("/login"))
}

async fn handle_login_form() -> Html<String> {
    views::login_form()
}

#[derive(Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
    pub role: String,
}

async fn handle_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(payload): Form<LoginPayload>,
) -> ServiceResult<(CookieJar, Redirect)> {
    let user = state
        .auth_service
        .login(&payload.email, &payload.password, &payload.role)
        .await?;
    let target = match user.role {
        Role::Admin => "/admin/dashboard",
        Role::Player => "/player/dashboard",
    };
    let token = state.session_service.create(user);
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .build();
    Ok((jar.add(cookie), Redirect::to(target)))
}

async fn handle_logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.session_service.destroy(cookie.value());
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/").build());
    (jar, Redirect::to("/login"))
}

async fn handle_player_dashboard(
    PlayerSession(user): PlayerSession,
    State(state): State<AppState>,
) -> ServiceResult<Html<String>> {
    let games = state.game_service.list_with_counts().await?;
    Ok(views::player_dashboard(&user, &games))
}

async fn handle_enroll(
    PlayerSession(user): PlayerSession,
    State(state): State<AppState>,
    Path(id): Path<GameId>,
) -> ServiceResult<Redirect> {
    state.enrollment_service.enroll(user.id, id).await?;
    Ok(Redirect::to("/player/dashboard"))
}

async fn handle_admin_dashboard(
    AdminSession(user): AdminSession,
    State(state): State<AppState>,
) -> ServiceResult<Html<String>> {
    let games = state.game_service.list_owned(user.id).await?;
    Ok(views::admin_dashboard(&user, &games))
}

async fn handle_create_game_form(AdminSession(_): AdminSession) -> Html<String> {
    views::create_game_form()
}

#[derive(Deserialize)]
pub struct GamePayload {
    pub title: String,
    pub description: String,
    pub date: String,
    pub player_limit: i64,
}

impl From<GamePayload> for GameDraft {
    fn from(payload: GamePayload) -> Self {
        GameDraft {
            title: payload.title,
            description: payload.description,
            date: payload.date,
            player_limit: payload.player_limit,
        }
    }
}

async fn handle_create_game(
    AdminSession(user): AdminSession,
    State(state): State<AppState>,
    Form(payload): Form<GamePayload>,
) -> ServiceResult<Redirect> {
    state.game_service.create(user.id, payload.into()).await?;
    Ok(Redirect::to("/admin/dashboard"))
}

async fn handle_edit_game_form(
    AdminSession(user): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<GameId>,
) -> ServiceResult<Html<String>> {
    let game = state.game_service.get_owned(user.id, id).await?;
    Ok(views::edit_game_form(&game))
}

async fn handle_edit_game(
    AdminSession(user): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<GameId>,
    Form(payload): Form<GamePayload>,
) -> ServiceResult<Redirect> {
    state
        .game_service
        .update(user.id, id, payload.into())
        .await?;
    Ok(Redirect::to("/admin/dashboard"))
}

async fn handle_delete_game(
    AdminSession(user): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<GameId>,
) -> ServiceResult<Redirect> {
    state.game_service.delete(user.id, id).await?;
    Ok(Redirect::to("/admin/dashboard"))
}
