use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::{
    app::{ServiceError, ServiceResult},
    enrollment::EnrollOutcome,
    game::{Game, GameDraft, GameId, GameWithCount},
};

#[async_trait::async_trait]
pub trait GameRepository {
    async fn create_game(&self, admin_id: i64, draft: &GameDraft) -> ServiceResult<GameId>;
    async fn get_game(&self, id: GameId) -> ServiceResult<Option<Game>>;
    async fn list_by_owner(&self, admin_id: i64) -> ServiceResult<Vec<Game>>;
    async fn list_with_counts(&self) -> ServiceResult<Vec<GameWithCount>>;
    /// Overwrites the game's fields. Ownership is re-verified inside the same
    /// transaction as the write.
    async fn update_game(&self, admin_id: i64, id: GameId, draft: &GameDraft)
    -> ServiceResult<()>;
    async fn delete_game(&self, admin_id: i64, id: GameId) -> ServiceResult<()>;
    /// Atomic admission: the capacity check and the insert are one SQL
    /// statement, so concurrent attempts for the last free slot cannot both
    /// succeed. A duplicate enrollment is a conflict, reported before the
    /// capacity check; a player already enrolled in a full game gets the
    /// conflict, not "full".
    async fn try_enroll(&self, player_id: i64, game_id: GameId) -> ServiceResult<EnrollOutcome>;
}

pub struct SqliteGameRepository {
    pool: Pool<Sqlite>,
}

impl SqliteGameRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn game_from_row(row: &SqliteRow) -> sqlx::Result<Game> {
        Ok(Game {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            date: row.try_get("date")?,
            player_limit: row.try_get("player_limit")?,
            created_by: row.try_get("created_by")?,
        })
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait::async_trait]
impl GameRepository for SqliteGameRepository {
    async fn create_game(&self, admin_id: i64, draft: &GameDraft) -> ServiceResult<GameId> {
        let result = sqlx::query(
            "INSERT INTO games (title, description, date, player_limit, created_by) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.date)
        .bind(draft.player_limit)
        .bind(admin_id)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn get_game(&self, id: GameId) -> ServiceResult<Option<Game>> {
        let row = sqlx::query("SELECT * FROM games WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(Self::game_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_by_owner(&self, admin_id: i64) -> ServiceResult<Vec<Game>> {
        let rows = sqlx::query("SELECT * FROM games WHERE created_by = ? ORDER BY date")
            .bind(admin_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| Self::game_from_row(row).map_err(ServiceError::from))
            .collect()
    }

    async fn list_with_counts(&self) -> ServiceResult<Vec<GameWithCount>> {
        let rows = sqlx::query(
            "SELECT g.*, COUNT(e.id) AS enrolled_count
             FROM games g
             LEFT JOIN enrollments e ON g.id = e.game_id
             GROUP BY g.id
             ORDER BY g.date",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| {
                let game = Self::game_from_row(row)?;
                let enrolled_count = row.try_get("enrolled_count")?;
                Ok(GameWithCount {
                    game,
                    enrolled_count,
                })
            })
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(ServiceError::from)
    }

    async fn update_game(
        &self,
        admin_id: i64,
        id: GameId,
        draft: &GameDraft,
    ) -> ServiceResult<()> {
        let mut tx = self.pool.begin().await?;
        let owner: Option<i64> = sqlx::query_scalar("SELECT created_by FROM games WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(owner) = owner else {
            return ServiceError::not_found("Game not found");
        };
        if owner != admin_id {
            return ServiceError::forbidden("Game belongs to another admin");
        }
        sqlx::query(
            "UPDATE games SET title = ?, description = ?, date = ?, player_limit = ? WHERE id = ?",
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.date)
        .bind(draft.player_limit)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_game(&self, admin_id: i64, id: GameId) -> ServiceResult<()> {
        let mut tx = self.pool.begin().await?;
        let owner: Option<i64> = sqlx::query_scalar("SELECT created_by FROM games WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(owner) = owner else {
            return ServiceError::not_found("Game not found");
        };
        if owner != admin_id {
            return ServiceError::forbidden("Game belongs to another admin");
        }
        sqlx::query("DELETE FROM enrollments WHERE game_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM games WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn try_enroll(&self, player_id: i64, game_id: GameId) -> ServiceResult<EnrollOutcome> {
        // Duplicates are classified up front; in a full game the capacity
        // predicate would otherwise mask the unique violation. The UNIQUE
        // constraint below still catches racing duplicates.
        let enrolled: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM enrollments WHERE player_id = ? AND game_id = ?")
                .bind(player_id)
                .bind(game_id)
                .fetch_optional(&self.pool)
                .await?;
        if enrolled.is_some() {
            return ServiceError::conflict("Already enrolled");
        }

        // A missing game makes the limit subquery NULL, which fails the
        // comparison, so both "full" and "absent" end up with zero rows.
        let result = sqlx::query(
            "INSERT INTO enrollments (player_id, game_id)
             SELECT ?1, ?2
             WHERE (SELECT COUNT(*) FROM enrollments WHERE game_id = ?2)
                 < (SELECT player_limit FROM games WHERE id = ?2)",
        )
        .bind(player_id)
        .bind(game_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ServiceError::Conflict("Already enrolled".to_string())
            } else {
                ServiceError::Database(e)
            }
        })?;

        if result.rows_affected() == 1 {
            return Ok(EnrollOutcome::Admitted);
        }

        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM games WHERE id = ?")
            .bind(game_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            Ok(EnrollOutcome::GameNotFound)
        } else {
            Ok(EnrollOutcome::Full)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        persistence::{create_db_pool_at, run_migrations},
        session::Role,
    };

    async fn test_pool() -> Pool<Sqlite> {
        let db_path =
            std::env::temp_dir().join(format!("matchday-games-{}.db", uuid::Uuid::new_v4()));
        let pool = create_db_pool_at(db_path.to_str().unwrap()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    async fn seed_user(pool: &Pool<Sqlite>, name: &str, role: Role) -> i64 {
        sqlx::query("INSERT INTO users (name, email, password_hash, role) VALUES (?, ?, ?, ?)")
            .bind(name)
            .bind(format!("{}@example.com", name))
            .bind("$2b$10$stub")
            .bind(role.as_str())
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    fn draft(player_limit: i64) -> GameDraft {
        GameDraft {
            title: "Sunday league".to_string(),
            description: "Bring boots".to_string(),
            date: "2026-09-06".to_string(),
            player_limit,
        }
    }

    #[tokio::test]
    async fn test_concurrent_enrollment_never_exceeds_capacity() {
        let pool = test_pool().await;
        let admin = seed_user(&pool, "admin", Role::Admin).await;
        let repo = Arc::new(SqliteGameRepository::new(pool.clone()));
        let game = repo.create_game(admin, &draft(2)).await.unwrap();

        let mut players = Vec::new();
        for name in ["p1", "p2", "p3"] {
            players.push(seed_user(&pool, name, Role::Player).await);
        }

        let mut tasks = Vec::new();
        for player in players {
            let repo = repo.clone();
            tasks.push(tokio::spawn(
                async move { repo.try_enroll(player, game).await },
            ));
        }

        let mut admitted = 0;
        let mut full = 0;
        for task in tasks {
            match task.await.unwrap().unwrap() {
                EnrollOutcome::Admitted => admitted += 1,
                EnrollOutcome::Full => full += 1,
                EnrollOutcome::GameNotFound => panic!("game exists"),
            }
        }
        assert_eq!(admitted, 2);
        assert_eq!(full, 1);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE game_id = ?")
            .bind(game)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_enroll_outcomes() {
        let pool = test_pool().await;
        let admin = seed_user(&pool, "admin", Role::Admin).await;
        let player = seed_user(&pool, "player", Role::Player).await;
        let repo = SqliteGameRepository::new(pool.clone());
        let game = repo.create_game(admin, &draft(1)).await.unwrap();

        assert_eq!(
            repo.try_enroll(player, game + 1).await.unwrap(),
            EnrollOutcome::GameNotFound
        );
        assert_eq!(
            repo.try_enroll(player, game).await.unwrap(),
            EnrollOutcome::Admitted
        );
        assert!(matches!(
            repo.try_enroll(player, game).await.unwrap_err(),
            ServiceError::Conflict(_)
        ));

        let other = seed_user(&pool, "other", Role::Player).await;
        assert_eq!(
            repo.try_enroll(other, game).await.unwrap(),
            EnrollOutcome::Full
        );
    }

    #[tokio::test]
    async fn test_duplicate_in_full_game_is_conflict_not_full() {
        let pool = test_pool().await;
        let admin = seed_user(&pool, "admin", Role::Admin).await;
        let player = seed_user(&pool, "player", Role::Player).await;
        let repo = SqliteGameRepository::new(pool);
        let game = repo.create_game(admin, &draft(1)).await.unwrap();
        repo.try_enroll(player, game).await.unwrap();

        // The game is now full; the retrying player still gets the
        // duplicate classification, not "full".
        let err = repo.try_enroll(player, game).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(msg) if msg == "Already enrolled"));
    }

    #[tokio::test]
    async fn test_update_and_delete_enforce_ownership_in_transaction() {
        let pool = test_pool().await;
        let admin_a = seed_user(&pool, "a", Role::Admin).await;
        let admin_b = seed_user(&pool, "b", Role::Admin).await;
        let repo = SqliteGameRepository::new(pool);
        let game = repo.create_game(admin_a, &draft(4)).await.unwrap();

        assert!(matches!(
            repo.update_game(admin_b, game, &draft(8)).await.unwrap_err(),
            ServiceError::Forbidden(_)
        ));
        assert!(matches!(
            repo.delete_game(admin_b, game).await.unwrap_err(),
            ServiceError::Forbidden(_)
        ));
        assert!(matches!(
            repo.update_game(admin_a, game + 1, &draft(8)).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));

        repo.update_game(admin_a, game, &draft(8)).await.unwrap();
        let updated = repo.get_game(game).await.unwrap().unwrap();
        assert_eq!(updated.player_limit, 8);

        repo.delete_game(admin_a, game).await.unwrap();
        assert!(repo.get_game(game).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_enrollments_with_the_game() {
        let pool = test_pool().await;
        let admin = seed_user(&pool, "admin", Role::Admin).await;
        let player = seed_user(&pool, "player", Role::Player).await;
        let repo = SqliteGameRepository::new(pool.clone());
        let game = repo.create_game(admin, &draft(4)).await.unwrap();
        repo.try_enroll(player, game).await.unwrap();

        repo.delete_game(admin, game).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enrollments")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_listing_queries() {
        let pool = test_pool().await;
        let admin_a = seed_user(&pool, "a", Role::Admin).await;
        let admin_b = seed_user(&pool, "b", Role::Admin).await;
        let player = seed_user(&pool, "player", Role::Player).await;
        let repo = SqliteGameRepository::new(pool);
        let game_a = repo.create_game(admin_a, &draft(4)).await.unwrap();
        repo.create_game(admin_b, &draft(4)).await.unwrap();
        repo.try_enroll(player, game_a).await.unwrap();

        let owned = repo.list_by_owner(admin_a).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id, game_a);

        let listed = repo.list_with_counts().await.unwrap();
        assert_eq!(listed.len(), 2);
        let with_count = listed.iter().find(|g| g.game.id == game_a).unwrap();
        assert_eq!(with_count.enrolled_count, 1);
        assert!(listed.iter().any(|g| g.enrolled_count == 0));
    }
}
