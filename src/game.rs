use chrono::NaiveDate;

use crate::app::{ArcGameRepository, ServiceError, ServiceResult};

pub type GameId = i64;

#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub id: GameId,
    pub title: String,
    pub description: String,
    pub date: String,
    pub player_limit: i64,
    pub created_by: i64,
}

/// A game joined with its current enrollment count, for capacity display on
/// the player dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct GameWithCount {
    pub game: Game,
    pub enrolled_count: i64,
}

/// Fields an admin submits when creating or editing a game.
#[derive(Debug, Clone)]
pub struct GameDraft {
    pub title: String,
    pub description: String,
    pub date: String,
    pub player_limit: i64,
}

#[async_trait::async_trait]
pub trait GameService {
    async fn list_owned(&self, admin_id: i64) -> ServiceResult<Vec<Game>>;
    async fn list_with_counts(&self) -> ServiceResult<Vec<GameWithCount>>;
    async fn create(&self, admin_id: i64, draft: GameDraft) -> ServiceResult<GameId>;
    /// Loads a game for editing; only the owning admin may see it.
    async fn get_owned(&self, admin_id: i64, game_id: GameId) -> ServiceResult<Game>;
    async fn update(&self, admin_id: i64, game_id: GameId, draft: GameDraft) -> ServiceResult<()>;
    async fn delete(&self, admin_id: i64, game_id: GameId) -> ServiceResult<()>;
}

pub struct GameServiceImpl {
    game_repository: ArcGameRepository,
}

impl GameServiceImpl {
    pub fn new(game_repository: ArcGameRepository) -> Self {
        Self { game_repository }
    }

    fn validate_draft(draft: &GameDraft) -> ServiceResult<()> {
        if draft.title.trim().is_empty() {
            return ServiceError::validation("Title must not be empty");
        }
        if draft.player_limit < 1 {
            return ServiceError::validation("Player limit must be a positive integer");
        }
        if NaiveDate::parse_from_str(&draft.date, "%Y-%m-%d").is_err() {
            return ServiceError::validation("Date must be of the form YYYY-MM-DD");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl GameService for GameServiceImpl {
    async fn list_owned(&self, admin_id: i64) -> ServiceResult<Vec<Game>> {
        self.game_repository.list_by_owner(admin_id).await
    }

    async fn list_with_counts(&self) -> ServiceResult<Vec<GameWithCount>> {
        self.game_repository.list_with_counts().await
    }

    async fn create(&self, admin_id: i64, draft: GameDraft) -> ServiceResult<GameId> {
        Self::validate_draft(&draft)?;
        let id = self.game_repository.create_game(admin_id, &draft).await?;
        log::info!("admin {} created game {} ({})", admin_id, id, draft.title);
        Ok(id)
    }

    async fn get_owned(&self, admin_id: i64, game_id: GameId) -> ServiceResult<Game> {
        let Some(game) = self.game_repository.get_game(game_id).await? else {
            return ServiceError::not_found("Game not found");
        };
        if game.created_by != admin_id {
            return ServiceError::forbidden("Game belongs to another admin");
        }
        Ok(game)
    }

    async fn update(&self, admin_id: i64, game_id: GameId, draft: GameDraft) -> ServiceResult<()> {
        Self::validate_draft(&draft)?;
        self.game_repository
            .update_game(admin_id, game_id, &draft)
            .await?;
        log::info!("admin {} updated game {}", admin_id, game_id);
        Ok(())
    }

    async fn delete(&self, admin_id: i64, game_id: GameId) -> ServiceResult<()> {
        self.game_repository.delete_game(admin_id, game_id).await?;
        log::info!("admin {} deleted game {}", admin_id, game_id);
        Ok(())
    }
}
