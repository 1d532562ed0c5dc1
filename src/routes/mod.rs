// Route exports
pub mod exclusions;
pub mod participants;
pub mod rounds;
pub mod wishlist;

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;

use crate::core::{MatchError, Matcher, Notifier};
use crate::models::{ErrorResponse, HealthResponse, ParticipantId};
use crate::services::{PostgresClient, PostgresError, SessionStore};

/// Header carrying the administrator key
pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";
/// Header carrying the calling participant's chat user id
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<PostgresClient>,
    pub notifier: Arc<dyn Notifier>,
    pub sessions: Arc<SessionStore>,
    pub matcher: Matcher,
    pub admin_key: Arc<str>,
    pub matching_seed: Option<u64>,
    pub notify_concurrency: usize,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(participants::configure)
            .configure(exclusions::configure)
            .configure(rounds::configure)
            .configure(wishlist::configure),
    );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = state.db.health_check().await.unwrap_or(false);

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

pub(crate) fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status.as_u16(),
    })
}

/// Map a storage failure to a response, logging server-side faults
pub(crate) fn storage_error(context: &str, e: PostgresError) -> HttpResponse {
    match e {
        PostgresError::NotFound(what) => {
            error_response(StatusCode::NOT_FOUND, "Not found", format!("{} not found", what))
        }
        PostgresError::InvalidInput(inner) => match_error(&inner),
        other => {
            tracing::error!("{}: {}", context, other);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, context, other.to_string())
        }
    }
}

pub(crate) fn match_error(e: &MatchError) -> HttpResponse {
    match e {
        MatchError::Infeasible { .. } => error_response(
            StatusCode::CONFLICT,
            "Infeasible",
            format!(
                "{}. Change the exclusions or add more participants.",
                e
            ),
        ),
        _ => error_response(StatusCode::BAD_REQUEST, "Invalid input", e.to_string()),
    }
}

/// Reject the request unless it carries the configured admin key
pub(crate) fn require_admin(req: &HttpRequest, state: &AppState) -> Result<(), HttpResponse> {
    let provided = req
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if !state.admin_key.is_empty() && key == &*state.admin_key => Ok(()),
        _ => Err(error_response(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "Administrator access required",
        )),
    }
}

/// Chat user id of the caller
pub(crate) fn caller_id(req: &HttpRequest) -> Result<ParticipantId, HttpResponse> {
    req.headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<ParticipantId>().ok())
        .ok_or_else(|| {
            error_response(
                StatusCode::BAD_REQUEST,
                "Missing user id",
                format!("{} header with a numeric user id is required", USER_ID_HEADER),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_caller_id_parsing() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "12345"))
            .to_http_request();
        assert_eq!(caller_id(&req).ok(), Some(12345));

        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "abc"))
            .to_http_request();
        assert!(caller_id(&req).is_err());

        let req = TestRequest::default().to_http_request();
        assert!(caller_id(&req).is_err());
    }

    #[test]
    fn test_match_error_status() {
        let infeasible = match_error(&MatchError::Infeasible { matched: 1, required: 2 });
        assert_eq!(infeasible.status(), StatusCode::CONFLICT);

        let invalid = match_error(&MatchError::TooFewParticipants { count: 1 });
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_storage_error_status() {
        let missing = storage_error("lookup", PostgresError::NotFound("participant 1".into()));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let self_pair = storage_error(
            "exclusion",
            PostgresError::InvalidInput(MatchError::SelfExclusion("1".into())),
        );
        assert_eq!(self_pair.status(), StatusCode::BAD_REQUEST);
    }
}
