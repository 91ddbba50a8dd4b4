use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::models::{Identity, LeaderboardEntry, Question};
use crate::protocol::{RegistrationForm, SignInForm};

use super::{ApiError, QuizApi};

#[derive(Default)]
struct CacheState {
    entries: Option<Vec<LeaderboardEntry>>,
    /// Bumped on every invalidation.
    generation: u64,
}

/// Caches the last leaderboard until something invalidates it.
///
/// The lock is never held across a fetch. A fetch that started before an
/// invalidation returns its entries but does not cache them.
#[derive(Default)]
pub struct LeaderboardCache {
    state: Mutex<CacheState>,
}

impl LeaderboardCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached entries, fetching them first if the cache is empty.
    pub async fn get(&self, api: &dyn QuizApi) -> Result<Vec<LeaderboardEntry>, ApiError> {
        let generation = {
            let state = self.state.lock().await;
            if let Some(cached) = state.entries.as_ref() {
                return Ok(cached.clone());
            }
            state.generation
        };

        let fresh = api.fetch_leaderboard().await?;

        let mut state = self.state.lock().await;
        if state.generation == generation {
            debug!("Leaderboard refreshed with {} entries", fresh.len());
            state.entries = Some(fresh.clone());
        } else {
            debug!("Leaderboard changed during fetch, not caching");
        }
        Ok(fresh)
    }

    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.entries = None;
        state.generation += 1;
    }

    pub async fn is_cached(&self) -> bool {
        self.state.lock().await.entries.is_some()
    }
}

/// The API plus the client-side caching around it.
#[derive(Clone)]
pub struct Backend {
    api: Arc<dyn QuizApi>,
    leaderboard: Arc<LeaderboardCache>,
}

impl Backend {
    pub fn new(api: Arc<dyn QuizApi>) -> Self {
        Self {
            api,
            leaderboard: Arc::new(LeaderboardCache::new()),
        }
    }

    pub async fn questions(&self) -> Result<Vec<Question>, ApiError> {
        self.api.fetch_questions().await
    }

    /// Submit one answer and report whether it was correct. A successful
    /// submission invalidates the leaderboard.
    pub async fn submit_answer(
        &self,
        identity: Option<&Identity>,
        question_id: &str,
        selected_option: &str,
    ) -> Result<bool, ApiError> {
        let response = self
            .api
            .submit_answer(identity, question_id, selected_option)
            .await?;
        self.leaderboard.invalidate().await;
        info!("Answer for {} judged correct={}", question_id, response.correct);
        Ok(response.correct)
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError> {
        self.leaderboard.get(self.api.as_ref()).await
    }

    pub fn leaderboard_cache(&self) -> &LeaderboardCache {
        &self.leaderboard
    }

    pub async fn register(&self, form: &RegistrationForm) -> Result<(), ApiError> {
        self.api.register(form).await
    }

    pub async fn sign_in(&self, form: &SignInForm) -> Result<Identity, ApiError> {
        self.api.sign_in(form).await
    }
}
