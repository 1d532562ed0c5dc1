use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::Validate;

use super::{caller_id, error_response, storage_error, AppState};
use crate::core::{WishlistAction, WishlistEvent, WishlistState};
use crate::models::{ParticipantId, WishlistMessageRequest, WishlistResponse};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/wishlist/me", web::get().to(my_wishlist))
        .route("/wishlist/me/edit", web::post().to(begin_edit))
        .route("/wishlist/me/message", web::post().to(receive_text))
        .route("/wishlist/me/cancel", web::post().to(cancel_edit));
}

/// The caller's own wishlist
///
/// GET /api/v1/wishlist/me
async fn my_wishlist(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    let user_id = match registered_caller(&state, &http_req).await {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.db.get_wishlist(user_id).await {
        Ok(wishlist) => {
            let message = if wishlist.is_some() {
                "Your wishlist".to_string()
            } else {
                "You have not written a wishlist yet".to_string()
            };
            HttpResponse::Ok().json(WishlistResponse {
                wishlist,
                state: state.sessions.state(user_id).await,
                message,
            })
        }
        Err(e) => storage_error("Failed to fetch wishlist", e),
    }
}

/// Start editing; the next message becomes the wishlist
///
/// POST /api/v1/wishlist/me/edit
async fn begin_edit(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    let user_id = match registered_caller(&state, &http_req).await {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let (next, action) = state.sessions.apply(user_id, WishlistEvent::BeginEdit).await;
    respond(&state, user_id, next, action).await
}

/// Text sent while editing
///
/// POST /api/v1/wishlist/me/message
async fn receive_text(
    state: web::Data<AppState>,
    req: web::Json<WishlistMessageRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let user_id = match registered_caller(&state, &http_req).await {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let event = WishlistEvent::Text(req.into_inner().text);
    let (next, action) = state.sessions.apply(user_id, event).await;
    respond(&state, user_id, next, action).await
}

/// Abandon editing
///
/// POST /api/v1/wishlist/me/cancel
async fn cancel_edit(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    let user_id = match registered_caller(&state, &http_req).await {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let (next, action) = state.sessions.apply(user_id, WishlistEvent::Cancel).await;
    respond(&state, user_id, next, action).await
}

async fn registered_caller(state: &AppState, http_req: &HttpRequest) -> Result<ParticipantId, HttpResponse> {
    let user_id = caller_id(http_req)?;

    match state.db.is_registered(user_id).await {
        Ok(true) => Ok(user_id),
        Ok(false) => Err(error_response(
            StatusCode::FORBIDDEN,
            "Not registered",
            "Register for the game before managing a wishlist",
        )),
        Err(e) => Err(storage_error("Failed to check registration", e)),
    }
}

async fn respond(
    state: &AppState,
    user_id: ParticipantId,
    next: WishlistState,
    action: WishlistAction,
) -> HttpResponse {
    let (wishlist, message) = match action {
        WishlistAction::Prompt => (
            None,
            "Send your wishlist as the next message, or cancel".to_string(),
        ),
        WishlistAction::Save(text) => {
            if let Err(e) = state.db.update_wishlist(user_id, &text).await {
                return storage_error("Failed to save wishlist", e);
            }
            tracing::info!("Participant {} updated their wishlist", user_id);
            (Some(text), "Wishlist saved".to_string())
        }
        WishlistAction::Reject(reason) => {
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, "Invalid wishlist", reason)
        }
        WishlistAction::Cancelled => (None, "Wishlist editing cancelled".to_string()),
        WishlistAction::Ignored => {
            return error_response(
                StatusCode::CONFLICT,
                "Not editing",
                "Start editing your wishlist first",
            )
        }
    };

    HttpResponse::Ok().json(WishlistResponse {
        wishlist,
        state: next,
        message,
    })
}
