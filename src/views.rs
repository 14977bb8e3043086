//! Minimal HTML rendering for the form pages and dashboards.

use axum::response::Html;

use crate::{
    game::{Game, GameWithCount},
    session::SessionUser,
};

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html><html><head><title>{}</title></head><body>{}</body></html>",
        escape(title),
        body
    ))
}

pub fn landing() -> Html<String> {
    page(
        "Matchday",
        "<h1>Matchday</h1>\
         <p><a href=\"/signup\">Sign up</a> or <a href=\"/login\">Log in</a></p>",
    )
}

pub fn signup_form() -> Html<String> {
    page(
        "Sign up",
        "<h1>Sign up</h1>\
         <form method=\"post\" action=\"/signup\">\
         <label>Name <input name=\"name\"></label><br>\
         <label>Email <input name=\"email\" type=\"email\"></label><br>\
         <label>Password <input name=\"password\" type=\"password\"></label><br>\
         <label>Role <select name=\"role\">\
         <option value=\"player\">Player</option>\
         <option value=\"admin\">Admin</option>\
         </select></label><br>\
         <button type=\"submit\">Sign up</button>\
         </form>",
    )
}

pub fn login_form() -> Html<String> {
    page(
        "Log in",
        "<h1>Log in</h1>\
         <form method=\"post\" action=\"/login\">\
         <label>Email <input name=\"email\" type=\"email\"></label><br>\
         <label>Password <input name=\"password\" type=\"password\"></label><br>\
         <label>Role <select name=\"role\">\
         <option value=\"player\">Player</option>\
         <option value=\"admin\">Admin</option>\
         </select></label><br>\
         <button type=\"submit\">Log in</button>\
         </form>",
    )
}

pub fn player_dashboard(user: &SessionUser, games: &[GameWithCount]) -> Html<String> {
    let mut rows = String::new();
    for entry in games {
        let full = entry.enrolled_count >= entry.game.player_limit;
        let action = if full {
            "<em>Full</em>".to_string()
        } else {
            format!(
                "<form method=\"post\" action=\"/games/{}/enroll\">\
                 <button type=\"submit\">Enroll</button></form>",
                entry.game.id
            )
        };
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}/{}</td><td>{}</td></tr>",
            escape(&entry.game.title),
            escape(&entry.game.description),
            escape(&entry.game.date),
            entry.enrolled_count,
            entry.game.player_limit,
            action
        ));
    }
    page(
        "Player dashboard",
        &format!(
            "<h1>Welcome, {}</h1>\
             <p><a href=\"/logout\">Log out</a></p>\
             <table><tr><th>Title</th><th>Description</th><th>Date</th>\
             <th>Enrolled</th><th></th></tr>{}</table>",
            escape(&user.name),
            rows
        ),
    )
}

pub fn admin_dashboard(user: &SessionUser, games: &[Game]) -> Html<String> {
    let mut rows = String::new();
    for game in games {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td>\
             <td><a href=\"/games/{id}/edit\">Edit</a></td>\
             <td><form method=\"post\" action=\"/games/{id}/delete\">\
             <button type=\"submit\">Delete</button></form></td></tr>",
            escape(&game.title),
            escape(&game.date),
            game.player_limit,
            id = game.id
        ));
    }
    page(
        "Admin dashboard",
        &format!(
            "<h1>Welcome, {}</h1>\
             <p><a href=\"/games/create\">Create game</a> | <a href=\"/logout\">Log out</a></p>\
             <table><tr><th>Title</th><th>Date</th><th>Limit</th><th></th><th></th></tr>{}</table>",
            escape(&user.name),
            rows
        ),
    )
}

fn game_form(action: &str, game: Option<&Game>) -> String {
    let (title, description, date, limit) = match game {
        Some(game) => (
            escape(&game.title),
            escape(&game.description),
            escape(&game.date),
            game.player_limit.to_string(),
        ),
        None => (String::new(), String::new(), String::new(), String::new()),
    };
    format!(
        "<form method=\"post\" action=\"{}\">\
         <label>Title <input name=\"title\" value=\"{}\"></label><br>\
         <label>Description <input name=\"description\" value=\"{}\"></label><br>\
         <label>Date <input name=\"date\" value=\"{}\" placeholder=\"YYYY-MM-DD\"></label><br>\
         <label>Player limit <input name=\"player_limit\" type=\"number\" value=\"{}\"></label><br>\
         <button type=\"submit\">Save</button>\
         </form>",
        action, title, description, date, limit
    )
}

pub fn create_game_form() -> Html<String> {
    page(
        "Create game",
        &format!("<h1>Create game</h1>{}", game_form("/games/create", None)),
    )
}

pub fn edit_game_form(game: &Game) -> Html<String> {
    page(
        "Edit game",
        &format!(
            "<h1>Edit game</h1>{}",
            game_form(&format!("/games/{}/edit", game.id), Some(game))
        ),
    )
}
