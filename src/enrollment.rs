use crate::{
    app::{ArcGameRepository, ServiceError, ServiceResult},
    game::GameId,
};

/// Result of the data layer's atomic admission attempt. Duplicate
/// enrollments surface as a `Conflict` error from the repository instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollOutcome {
    Admitted,
    GameNotFound,
    Full,
}

#[async_trait::async_trait]
pub trait EnrollmentService {
    /// Admits the player into the game if a slot is free. The capacity check
    /// and the insert happen atomically at the data layer, so concurrent
    /// attempts for the last slot cannot over-admit.
    async fn enroll(&self, player_id: i64, game_id: GameId) -> ServiceResult<()>;
}

pub struct EnrollmentServiceImpl {
    game_repository: ArcGameRepository,
}

impl EnrollmentServiceImpl {
    pub fn new(game_repository: ArcGameRepository) -> Self {
        Self { game_repository }
    }
}

#[async_trait::async_trait]
impl EnrollmentService for EnrollmentServiceImpl {
    async fn enroll(&self, player_id: i64, game_id: GameId) -> ServiceResult<()> {
        match self.game_repository.try_enroll(player_id, game_id).await? {
            EnrollOutcome::Admitted => {
                log::info!("player {} enrolled in game {}", player_id, game_id);
                Ok(())
            }
            EnrollOutcome::GameNotFound => ServiceError::not_found("Game not found"),
            EnrollOutcome::Full => ServiceError::capacity_exceeded("Game is full"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    };

    use super::*;
    use crate::{
        game::{Game, GameDraft, GameWithCount},
        persistence::games::GameRepository,
    };

    /// Repository stub with a fixed game of limited capacity.
    struct MockGameRepository {
        game_id: GameId,
        free_slots: AtomicI64,
        enrolled: std::sync::Mutex<Vec<i64>>,
    }

    impl MockGameRepository {
        fn new(game_id: GameId, capacity: i64) -> Self {
            Self {
                game_id,
                free_slots: AtomicI64::new(capacity),
                enrolled: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl GameRepository for MockGameRepository {
        async fn create_game(&self, _admin_id: i64, _draft: &GameDraft) -> ServiceResult<GameId> {
            unimplemented!()
        }

        async fn get_game(&self, _id: GameId) -> ServiceResult<Option<Game>> {
            unimplemented!()
        }

        async fn list_by_owner(&self, _admin_id: i64) -> ServiceResult<Vec<Game>> {
            unimplemented!()
        }

        async fn list_with_counts(&self) -> ServiceResult<Vec<GameWithCount>> {
            unimplemented!()
        }

        async fn update_game(
            &self,
            _admin_id: i64,
            _id: GameId,
            _draft: &GameDraft,
        ) -> ServiceResult<()> {
            unimplemented!()
        }

        async fn delete_game(&self, _admin_id: i64, _id: GameId) -> ServiceResult<()> {
            unimplemented!()
        }

        async fn try_enroll(&self, player_id: i64, game_id: GameId) -> ServiceResult<EnrollOutcome> {
            if game_id != self.game_id {
                return Ok(EnrollOutcome::GameNotFound);
            }
            let mut enrolled = self.enrolled.lock().unwrap();
            if enrolled.contains(&player_id) {
                return ServiceError::conflict("Already enrolled");
            }
            if self.free_slots.fetch_sub(1, Ordering::SeqCst) <= 0 {
                self.free_slots.fetch_add(1, Ordering::SeqCst);
                return Ok(EnrollOutcome::Full);
            }
            enrolled.push(player_id);
            Ok(EnrollOutcome::Admitted)
        }
    }

    fn service(repo: MockGameRepository) -> EnrollmentServiceImpl {
        EnrollmentServiceImpl::new(Arc::new(Box::new(repo)))
    }

    #[tokio::test]
    async fn test_enroll_admits_until_full() {
        let service = service(MockGameRepository::new(7, 2));
        service.enroll(1, 7).await.unwrap();
        service.enroll(2, 7).await.unwrap();

        let err = service.enroll(3, 7).await.unwrap_err();
        assert!(matches!(err, ServiceError::CapacityExceeded(msg) if msg == "Game is full"));
    }

    #[tokio::test]
    async fn test_enroll_in_missing_game_is_not_found() {
        let service = service(MockGameRepository::new(7, 2));
        let err = service.enroll(1, 99).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_enrollment_is_a_conflict() {
        let service = service(MockGameRepository::new(7, 2));
        service.enroll(1, 7).await.unwrap();

        let err = service.enroll(1, 7).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }
}
