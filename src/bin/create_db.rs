//! Creates the database schema and seeds one admin and one player account
//! for local testing.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS games (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    date TEXT NOT NULL,
    player_limit INTEGER NOT NULL,
    created_by INTEGER NOT NULL REFERENCES users(id)
);
CREATE TABLE IF NOT EXISTS enrollments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id INTEGER NOT NULL REFERENCES users(id),
    game_id INTEGER NOT NULL REFERENCES games(id),
    UNIQUE (player_id, game_id)
);
";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let db_path = std::env::var("MATCHDAY_DB").expect("MATCHDAY_DB env var not set");
    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .expect("Failed to create DB pool");

    sqlx::raw_sql(SCHEMA_SQL)
        .execute(&pool)
        .await
        .expect("Failed to create tables");
    println!("Created schema in {}", db_path);

    create_user(&pool, "Test Admin", "admin@example.com", "pw", "admin").await;
    create_user(&pool, "Test Player", "player@example.com", "pw", "player").await;
}

async fn create_user(
    pool: &sqlx::Pool<sqlx::Sqlite>,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) {
    let password_hash = bcrypt::hash(password, 10).expect("Failed to hash password");
    sqlx::query("INSERT INTO users (name, email, password_hash, role) VALUES (?, ?, ?, ?)")
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .execute(pool)
        .await
        .expect("Failed to create user");
    println!("Created {} {}", role, email);
}
