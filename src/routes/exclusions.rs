use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::collections::HashMap;

use super::{require_admin, storage_error, AppState};
use crate::models::{
    ExclusionChangeResponse, ExclusionRecord, ExclusionRequest, ExclusionView, ExclusionsResponse,
    NamedParticipant, Participant, ParticipantId,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/exclusions", web::get().to(list_exclusions))
        .route("/exclusions", web::post().to(add_exclusion))
        .route("/exclusions/remove", web::post().to(remove_exclusion));
}

/// List exclusions with names (admin)
///
/// GET /api/v1/exclusions
async fn list_exclusions(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    if let Err(denied) = require_admin(&http_req, &state) {
        return denied;
    }

    let exclusions = match state.db.list_exclusions().await {
        Ok(rows) => rows,
        Err(e) => return storage_error("Failed to list exclusions", e),
    };
    let participants = match state.db.list_participants().await {
        Ok(rows) => rows,
        Err(e) => return storage_error("Failed to list participants", e),
    };

    let views = name_exclusions(&exclusions, &participants);
    HttpResponse::Ok().json(ExclusionsResponse {
        count: views.len(),
        exclusions: views,
    })
}

/// Add an exclusion (admin)
///
/// POST /api/v1/exclusions
///
/// Request body:
/// ```json
/// { "user1Id": 1, "user2Id": 2 }
/// ```
/// Adding an existing pair succeeds with `changed: false`.
async fn add_exclusion(
    state: web::Data<AppState>,
    req: web::Json<ExclusionRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    if let Err(denied) = require_admin(&http_req, &state) {
        return denied;
    }

    for id in [req.user1_id, req.user2_id] {
        match state.db.is_registered(id).await {
            Ok(true) => {}
            Ok(false) => {
                return storage_error(
                    "Failed to add exclusion",
                    crate::services::PostgresError::NotFound(format!("participant {}", id)),
                )
            }
            Err(e) => return storage_error("Failed to add exclusion", e),
        }
    }

    match state.db.add_exclusion(req.user1_id, req.user2_id).await {
        Ok(changed) => {
            tracing::info!(
                "Exclusion {} <-> {} {}",
                req.user1_id,
                req.user2_id,
                if changed { "added" } else { "already present" }
            );
            HttpResponse::Ok().json(ExclusionChangeResponse { changed })
        }
        Err(e) => storage_error("Failed to add exclusion", e),
    }
}

/// Remove an exclusion (admin)
///
/// POST /api/v1/exclusions/remove
async fn remove_exclusion(
    state: web::Data<AppState>,
    req: web::Json<ExclusionRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    if let Err(denied) = require_admin(&http_req, &state) {
        return denied;
    }

    match state.db.remove_exclusion(req.user1_id, req.user2_id).await {
        Ok(changed) => HttpResponse::Ok().json(ExclusionChangeResponse { changed }),
        Err(e) => storage_error("Failed to remove exclusion", e),
    }
}

/// Attach display names; unknown ids show as their number
pub(crate) fn name_exclusions(
    exclusions: &[ExclusionRecord],
    participants: &[Participant],
) -> Vec<ExclusionView> {
    let names: HashMap<ParticipantId, &Participant> =
        participants.iter().map(|p| (p.user_id, p)).collect();

    let named = |id: ParticipantId| match names.get(&id) {
        Some(p) => NamedParticipant::from(*p),
        None => NamedParticipant {
            user_id: id,
            name: id.to_string(),
        },
    };

    exclusions
        .iter()
        .map(|e| ExclusionView {
            id: e.id,
            first: named(e.user1_id),
            second: named(e.user2_id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_name_exclusions() {
        let participants = vec![Participant {
            user_id: 1,
            username: Some("anna".into()),
            first_name: "Anna".into(),
            last_name: Some("Petrova".into()),
            wishlist: None,
            registered_at: Utc::now(),
        }];
        let exclusions = vec![ExclusionRecord {
            id: 9,
            user1_id: 1,
            user2_id: 2,
        }];

        let views = name_exclusions(&exclusions, &participants);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].first.name, "Anna Petrova");
        assert_eq!(views[0].second.name, "2");
    }
}
