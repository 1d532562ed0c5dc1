// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{AssignmentRecord, ExclusionRecord, NamedParticipant, Participant, ParticipantId};
pub use requests::{ExclusionRequest, RegisterRequest, WishlistMessageRequest};
pub use responses::{
    AssignmentView, AssignmentsResponse, DistributeResponse, ErrorResponse, ExclusionChangeResponse,
    ExclusionView, ExclusionsResponse, HealthResponse, MyReceiverResponse, ParticipantsResponse,
    RegisterResponse, RemovedResponse, WishlistResponse,
};
