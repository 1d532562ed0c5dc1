use serde::{Deserialize, Serialize};

/// Chat user id; stable for the lifetime of a participant
pub type ParticipantId = i64;

/// Registered participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Participant {
    #[serde(rename = "userId")]
    pub user_id: ParticipantId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub wishlist: Option<String>,
    #[serde(rename = "registeredAt")]
    pub registered_at: chrono::DateTime<chrono::Utc>,
}

impl Participant {
    /// First and last name joined, as shown to other participants
    pub fn display_name(&self) -> String {
        match self.last_name.as_deref().map(str::trim) {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }

    /// Wishlist if one has been written
    pub fn wishlist(&self) -> Option<&str> {
        self.wishlist.as_deref().filter(|w| !w.trim().is_empty())
    }
}

/// Stored exclusion, canonical `user1_id < user2_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExclusionRecord {
    pub id: i64,
    #[serde(rename = "user1Id")]
    pub user1_id: ParticipantId,
    #[serde(rename = "user2Id")]
    pub user2_id: ParticipantId,
}

/// Stored giver → receiver pair of the current round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AssignmentRecord {
    #[serde(rename = "giverId")]
    pub giver_id: ParticipantId,
    #[serde(rename = "receiverId")]
    pub receiver_id: ParticipantId,
    #[serde(rename = "roundId")]
    pub round_id: uuid::Uuid,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Participant reference with a printable name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedParticipant {
    #[serde(rename = "userId")]
    pub user_id: ParticipantId,
    pub name: String,
}

impl From<&Participant> for NamedParticipant {
    fn from(p: &Participant) -> Self {
        Self {
            user_id: p.user_id,
            name: p.display_name(),
        }
    }
}
