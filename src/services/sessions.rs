use std::time::Duration;

use crate::core::session::{step, WishlistAction, WishlistEvent, WishlistState};
use crate::models::ParticipantId;

/// Per-participant wishlist conversation state
///
/// Entries expire after the configured TTL, so an abandoned edit falls back
/// to idle on its own.
pub struct SessionStore {
    states: moka::future::Cache<ParticipantId, WishlistState>,
}

impl SessionStore {
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let states = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { states }
    }

    pub async fn state(&self, user_id: ParticipantId) -> WishlistState {
        self.states.get(&user_id).await.unwrap_or_default()
    }

    /// Apply an event and store the resulting state
    pub async fn apply(&self, user_id: ParticipantId, event: WishlistEvent) -> (WishlistState, WishlistAction) {
        let current = self.state(user_id).await;
        let (next, action) = step(current, event);

        match next {
            WishlistState::Idle => self.states.invalidate(&user_id).await,
            WishlistState::AwaitingText => self.states.insert(user_id, next).await,
        }

        tracing::trace!("Wishlist session {}: {:?} -> {:?}", user_id, current, next);
        (next, action)
    }

    /// Forget any session, e.g. when the participant leaves
    pub async fn reset(&self, user_id: ParticipantId) {
        self.states.invalidate(&user_id).await;
    }
}
