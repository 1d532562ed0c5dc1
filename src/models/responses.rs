use serde::{Deserialize, Serialize};

use crate::core::DeliveryReport;
use crate::core::WishlistState;
use crate::models::domain::{NamedParticipant, Participant};

/// Registration outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub participant: Participant,
    #[serde(rename = "alreadyRegistered")]
    pub already_registered: bool,
}

/// Participant list for administrators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantsResponse {
    pub participants: Vec<Participant>,
    pub count: usize,
}

/// Exclusion entry with names resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionView {
    pub id: i64,
    pub first: NamedParticipant,
    pub second: NamedParticipant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionsResponse {
    pub exclusions: Vec<ExclusionView>,
    pub count: usize,
}

/// Result of adding or removing an exclusion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionChangeResponse {
    pub changed: bool,
}

/// Assignment entry with names resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentView {
    pub giver: NamedParticipant,
    pub receiver: NamedParticipant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentsResponse {
    #[serde(rename = "roundId")]
    pub round_id: Option<uuid::Uuid>,
    pub assignments: Vec<AssignmentView>,
    pub count: usize,
}

/// Outcome of a distribution round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributeResponse {
    #[serde(rename = "roundId")]
    pub round_id: uuid::Uuid,
    pub participants: usize,
    pub delivery: DeliveryReport,
}

/// A giver's own receiver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyReceiverResponse {
    pub receiver: Option<NamedParticipant>,
    pub wishlist: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistResponse {
    pub wishlist: Option<String>,
    pub state: WishlistState,
    pub message: String,
}

/// Removal outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovedResponse {
    pub removed: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
