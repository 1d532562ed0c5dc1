use actix_web::{web, HttpRequest, HttpResponse, Responder};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

use super::{caller_id, match_error, require_admin, storage_error, AppState};
use crate::core::{compose_assignment_message, deliver_all, Assignment, MatchError, Matcher, Notification};
use crate::models::{
    AssignmentRecord, AssignmentView, AssignmentsResponse, DistributeResponse, MyReceiverResponse,
    NamedParticipant, Participant, ParticipantId,
};
use crate::services::RoundSnapshot;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/rounds", web::post().to(distribute))
        .route("/rounds/current", web::get().to(view_assignments))
        .route("/rounds/current/mine", web::get().to(my_receiver));
}

/// Draw a new round and notify every giver (admin)
///
/// POST /api/v1/rounds
///
/// The previous round is replaced only once a new one is found. Delivery
/// failures are reported in the response and never undo the round.
async fn distribute(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    if let Err(denied) = require_admin(&http_req, &state) {
        return denied;
    }

    let snapshot = match state.db.load_round_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => return storage_error("Failed to load participants", e),
    };

    tracing::info!(
        "Drawing round for {} participants with {} exclusions",
        snapshot.participants.len(),
        snapshot.exclusions.len()
    );

    let assignment = match draw(&state.matcher, &snapshot, state.matching_seed) {
        Ok(assignment) => assignment,
        Err(e) => {
            tracing::warn!("Round not drawn: {}", e);
            return match_error(&e);
        }
    };

    let round_id = uuid::Uuid::new_v4();
    if let Err(e) = state.db.replace_assignments(round_id, &assignment).await {
        return storage_error("Failed to store round", e);
    }

    let notifications = build_notifications(&snapshot, &assignment);
    let delivery = deliver_all(state.notifier.as_ref(), notifications, state.notify_concurrency).await;

    tracing::info!(
        "Round {} drawn: notified {} of {} givers ({} failed)",
        round_id,
        delivery.sent,
        delivery.total,
        delivery.failed()
    );

    HttpResponse::Ok().json(DistributeResponse {
        round_id,
        participants: assignment.len(),
        delivery,
    })
}

/// View the current round with names (admin)
///
/// GET /api/v1/rounds/current
async fn view_assignments(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    if let Err(denied) = require_admin(&http_req, &state) {
        return denied;
    }

    let records = match state.db.list_assignments().await {
        Ok(records) => records,
        Err(e) => return storage_error("Failed to list assignments", e),
    };
    let participants = match state.db.list_participants().await {
        Ok(participants) => participants,
        Err(e) => return storage_error("Failed to list participants", e),
    };

    let views = name_assignments(&records, &participants);
    HttpResponse::Ok().json(AssignmentsResponse {
        round_id: records.first().map(|r| r.round_id),
        count: views.len(),
        assignments: views,
    })
}

/// The caller's receiver and their wishlist
///
/// GET /api/v1/rounds/current/mine
async fn my_receiver(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    let user_id = match caller_id(&http_req) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let receiver_id = match state.db.get_receiver(user_id).await {
        Ok(Some(id)) => id,
        Ok(None) => {
            return HttpResponse::Ok().json(MyReceiverResponse {
                receiver: None,
                wishlist: None,
            })
        }
        Err(e) => return storage_error("Failed to look up receiver", e),
    };

    match state.db.get_participant(receiver_id).await {
        Ok(Some(receiver)) => HttpResponse::Ok().json(MyReceiverResponse {
            receiver: Some(NamedParticipant::from(&receiver)),
            wishlist: receiver.wishlist().map(str::to_string),
        }),
        Ok(None) => HttpResponse::Ok().json(MyReceiverResponse {
            receiver: None,
            wishlist: None,
        }),
        Err(e) => storage_error("Failed to look up receiver", e),
    }
}

/// Run the matcher over a snapshot, seeded when a seed is configured
pub(crate) fn draw(
    matcher: &Matcher,
    snapshot: &RoundSnapshot,
    seed: Option<u64>,
) -> Result<Assignment<ParticipantId>, MatchError> {
    let ids = snapshot.participant_ids();
    let excluded = |a: &ParticipantId, b: &ParticipantId| snapshot.exclusions.is_excluded(a, b);

    match seed {
        Some(seed) => matcher.assign_with_rng(&ids, excluded, &mut StdRng::seed_from_u64(seed)),
        None => matcher.assign(&ids, excluded),
    }
}

/// One message per giver naming their receiver
pub(crate) fn build_notifications(
    snapshot: &RoundSnapshot,
    assignment: &Assignment<ParticipantId>,
) -> Vec<Notification> {
    assignment
        .iter()
        .filter_map(|pair| {
            let receiver = snapshot.find(pair.receiver)?;
            Some(Notification {
                recipient: pair.giver,
                text: compose_assignment_message(&receiver.display_name(), receiver.wishlist()),
            })
        })
        .collect()
}

pub(crate) fn name_assignments(
    records: &[AssignmentRecord],
    participants: &[Participant],
) -> Vec<AssignmentView> {
    let names: HashMap<ParticipantId, &Participant> =
        participants.iter().map(|p| (p.user_id, p)).collect();

    let named = |id: ParticipantId| match names.get(&id) {
        Some(p) => NamedParticipant::from(*p),
        None => NamedParticipant {
            user_id: id,
            name: id.to_string(),
        },
    };

    records
        .iter()
        .map(|r| AssignmentView {
            giver: named(r.giver_id),
            receiver: named(r.receiver_id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ExclusionSet, MatcherSettings};
    use chrono::Utc;

    fn participant(user_id: ParticipantId, first_name: &str, wishlist: Option<&str>) -> Participant {
        Participant {
            user_id,
            username: None,
            first_name: first_name.to_string(),
            last_name: None,
            wishlist: wishlist.map(str::to_string),
            registered_at: Utc::now(),
        }
    }

    fn snapshot(exclusions: Vec<(ParticipantId, ParticipantId)>) -> RoundSnapshot {
        RoundSnapshot {
            participants: vec![
                participant(1, "Anna", Some("tea")),
                participant(2, "Boris", None),
                participant(3, "Vera", Some("socks")),
                participant(4, "Gleb", None),
            ],
            exclusions: ExclusionSet::from_pairs(exclusions).unwrap(),
        }
    }

    #[test]
    fn test_draw_respects_exclusions() {
        let snapshot = snapshot(vec![(1, 2), (3, 4)]);
        let matcher = Matcher::default();

        for _ in 0..20 {
            let assignment = draw(&matcher, &snapshot, None).unwrap();
            assert!(assignment
                .verify(&snapshot.participant_ids(), |a, b| snapshot.exclusions.is_excluded(a, b))
                .is_ok());
        }
    }

    #[test]
    fn test_seeded_draw_is_stable() {
        let snapshot = snapshot(vec![]);
        let matcher = Matcher::new(MatcherSettings { shuffle_attempts: 10 });

        let a = draw(&matcher, &snapshot, Some(99)).unwrap();
        let b = draw(&matcher, &snapshot, Some(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_draw_infeasible() {
        // 1 may not give to or receive from anyone
        let snapshot = snapshot(vec![(1, 2), (1, 3), (1, 4)]);
        let result = draw(&Matcher::default(), &snapshot, None);
        assert!(matches!(result, Err(MatchError::Infeasible { .. })));
    }

    #[test]
    fn test_notifications_name_receiver() {
        let snapshot = snapshot(vec![]);
        let assignment = draw(&Matcher::default(), &snapshot, Some(1)).unwrap();
        let notifications = build_notifications(&snapshot, &assignment);

        assert_eq!(notifications.len(), 4);
        for n in &notifications {
            let receiver_id = *assignment.receiver_of(&n.recipient).unwrap();
            let receiver = snapshot.find(receiver_id).unwrap();
            assert!(n.text.contains(&receiver.first_name));
            if let Some(wishlist) = receiver.wishlist() {
                assert!(n.text.contains(wishlist));
            }
        }
    }

    #[test]
    fn test_name_assignments() {
        let records = vec![AssignmentRecord {
            giver_id: 1,
            receiver_id: 5,
            round_id: uuid::Uuid::new_v4(),
            created_at: Utc::now(),
        }];
        let views = name_assignments(&records, &[participant(1, "Anna", None)]);
        assert_eq!(views[0].giver.name, "Anna");
        assert_eq!(views[0].receiver.name, "5");
    }
}
