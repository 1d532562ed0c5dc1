use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::Validate;

use super::{caller_id, error_response, require_admin, storage_error, AppState};
use crate::models::{ParticipantId, ParticipantsResponse, RegisterRequest, RegisterResponse, RemovedResponse};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/participants", web::post().to(register))
        .route("/participants", web::get().to(list_participants))
        .route("/participants/me/leave", web::post().to(leave_game))
        .route("/participants/{user_id}", web::delete().to(remove_participant));
}

/// Join the game
///
/// POST /api/v1/participants
///
/// Registering again refreshes the stored names and keeps the wishlist.
async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let result = state
        .db
        .upsert_participant(
            req.user_id,
            req.username.as_deref(),
            req.first_name.trim(),
            req.last_name.as_deref(),
        )
        .await;

    match result {
        Ok((participant, already_registered)) => {
            if !already_registered {
                tracing::info!("Registered participant {}", participant.user_id);
            }
            HttpResponse::Ok().json(RegisterResponse {
                participant,
                already_registered,
            })
        }
        Err(e) => storage_error("Failed to register participant", e),
    }
}

/// List participants (admin)
///
/// GET /api/v1/participants
async fn list_participants(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    if let Err(denied) = require_admin(&http_req, &state) {
        return denied;
    }

    match state.db.list_participants().await {
        Ok(participants) => HttpResponse::Ok().json(ParticipantsResponse {
            count: participants.len(),
            participants,
        }),
        Err(e) => storage_error("Failed to list participants", e),
    }
}

/// Remove a participant (admin)
///
/// DELETE /api/v1/participants/{user_id}
///
/// Every exclusion and assignment referencing the participant goes with them.
async fn remove_participant(
    state: web::Data<AppState>,
    path: web::Path<ParticipantId>,
    http_req: HttpRequest,
) -> impl Responder {
    if let Err(denied) = require_admin(&http_req, &state) {
        return denied;
    }

    let user_id = path.into_inner();
    remove(&state, user_id).await
}

/// Leave the game
///
/// POST /api/v1/participants/me/leave
async fn leave_game(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    let user_id = match caller_id(&http_req) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    remove(&state, user_id).await
}

async fn remove(state: &AppState, user_id: ParticipantId) -> HttpResponse {
    match state.db.remove_participant(user_id).await {
        Ok(removed) => {
            state.sessions.reset(user_id).await;
            if !removed {
                return error_response(
                    StatusCode::NOT_FOUND,
                    "Not found",
                    format!("participant {} is not registered", user_id),
                );
            }
            HttpResponse::Ok().json(RemovedResponse { removed })
        }
        Err(e) => storage_error("Failed to remove participant", e),
    }
}
