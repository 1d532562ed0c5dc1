use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::ParticipantId;

/// Request to join the game
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: ParticipantId,
    #[serde(default)]
    pub username: Option<String>,
    #[validate(length(min = 1, max = 256))]
    #[serde(alias = "first_name", rename = "firstName")]
    pub first_name: String,
    #[serde(alias = "last_name", rename = "lastName", default)]
    pub last_name: Option<String>,
}

/// Request to add or remove an exclusion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionRequest {
    #[serde(alias = "user1_id", rename = "user1Id")]
    pub user1_id: ParticipantId,
    #[serde(alias = "user2_id", rename = "user2Id")]
    pub user2_id: ParticipantId,
}

/// Text sent by a participant while editing their wishlist
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WishlistMessageRequest {
    #[validate(length(min = 1))]
    pub text: String,
}
